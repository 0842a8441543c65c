//! Contract ABI definitions
//!
//! Uses alloy's sol! macro to generate type-safe bindings for the bridge
//! control, the token standards it mirrors, the royalty registry and
//! Multicall3.

#![allow(clippy::too_many_arguments)]

use alloy::sol;

sol! {
    /// Holder position for `airdrop721`
    struct AirdropUnit721 {
        address to;
        uint256[] tokenIds;
    }

    /// Holder position for `airdrop1155`
    struct AirdropUnit1155 {
        address to;
        uint256[] tokenIds;
        uint256[] amounts;
        bytes data;
    }

    /// Bridge control: owns the factory and the original <-> bridged registry
    #[sol(rpc)]
    contract BridgeControl {
        // ========================================================================
        // Registry
        // ========================================================================

        function bridgedAddressForOriginal(address original) external view returns (address);

        function originalAddressForBridged(address bridged) external view returns (address);

        function bridgingApproved(address original) external view returns (bool);

        function adminSetBridgingApproved(address collection, bool approved) external;

        function clearBridgedStorage(address original) external;

        // ========================================================================
        // Deployment
        // ========================================================================

        function deployERC721(
            address original,
            address originalOwner,
            string name,
            string symbol,
            string baseURI,
            string extension,
            address royaltyRecipient,
            uint256 royaltyBps,
            bool enumerable
        ) external;

        function deployERC1155(
            address original,
            address originalOwner,
            address royaltyRecipient,
            uint256 royaltyBps,
            string name
        ) external;

        // ========================================================================
        // State replay
        // ========================================================================

        function airdrop721(address bridged, AirdropUnit721[] units) external;

        function airdrop1155(address bridged, AirdropUnit1155[] units) external;

        function batchSetTokenURIs(address bridged, uint256 startTokenId, string[] uris) external;
    }

    /// ERC-721 reads used on original collections
    #[sol(rpc)]
    contract IERC721 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function tokenURI(uint256 tokenId) external view returns (string);
        function totalSupply() external view returns (uint256);
        function tokenByIndex(uint256 index) external view returns (uint256);
        function owner() external view returns (address);
        function royaltyInfo(uint256 tokenId, uint256 salePrice) external view returns (address receiver, uint256 royaltyAmount);
        function supportsInterface(bytes4 interfaceId) external view returns (bool);
    }

    /// ERC-1155 metadata read
    #[sol(rpc)]
    contract IERC1155 {
        function uri(uint256 id) external view returns (string);
    }

    /// Royalty registry on the source chain
    #[sol(rpc)]
    contract RoyaltyRegistry {
        function collectionRoyalties(address collection) external view returns (address recipient, uint256 fee);
    }

    /// Admin surface of a bridged token contract
    #[sol(rpc)]
    contract BridgedToken {
        function batchSetTokenURIs(uint256 startTokenId, string[] uris) external;
        function setTokenURI(uint256 tokenId, string uri) external;
        function owner() external view returns (address);
        function transferOwnership(address newOwner) external;
    }

    #[sol(rpc)]
    contract IMulticall3 {
        struct Call3 {
            address target;
            bool allowFailure;
            bytes callData;
        }

        struct Call3Result {
            bool success;
            bytes returnData;
        }

        function aggregate3(Call3[] calldata calls) external payable returns (Call3Result[] memory returnData);
    }
}
