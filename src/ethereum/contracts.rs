//! Solidity interfaces called by the tool.

use alloy::sol;

sol! {
    /// Minimal ERC-20 surface: balances, metadata and approvals.
    #[sol(rpc)]
    #[derive(Debug)]
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    /// Wormhole token bridge entry points used for outbound transfers.
    #[sol(rpc)]
    #[derive(Debug)]
    interface ITokenBridge {
        function transferTokens(
            address token,
            uint256 amount,
            uint16 recipientChain,
            bytes32 recipient,
            uint256 arbiterFee,
            uint32 nonce
        ) external payable returns (uint64 sequence);

        function wrapAndTransferETH(
            uint16 recipientChain,
            bytes32 recipient,
            uint256 arbiterFee,
            uint32 nonce
        ) external payable returns (uint64 sequence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, B256, U256};
    use alloy::sol_types::SolCall;

    #[test]
    fn test_transfer_tokens_signature() {
        assert_eq!(
            ITokenBridge::transferTokensCall::SIGNATURE,
            "transferTokens(address,uint256,uint16,bytes32,uint256,uint32)"
        );
    }

    #[test]
    fn test_approve_encoding() {
        let call = IERC20::approveCall {
            spender: Address::ZERO,
            amount: U256::from(42u64),
        };
        let data = call.abi_encode();
        // selector + two words
        assert_eq!(data.len(), 4 + 32 * 2);
        assert_eq!(&data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
    }

    #[test]
    fn test_wrap_and_transfer_encoding() {
        let call = ITokenBridge::wrapAndTransferETHCall {
            recipientChain: 22,
            recipient: B256::repeat_byte(0xab),
            arbiterFee: U256::ZERO,
            nonce: 7,
        };
        let data = call.abi_encode();
        assert_eq!(data.len(), 4 + 32 * 4);
        assert_eq!(&data[4 + 32..4 + 64], B256::repeat_byte(0xab).as_slice());
    }
}
