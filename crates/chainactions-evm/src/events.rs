//! Decode receipt-log entries into the five recognized token event shapes.
//!
//! Matching is by first topic (event signature) plus topic count, in a fixed
//! priority per log:
//! 1. WETH `Deposit` / `Withdrawal`
//! 2. ERC-721 `Transfer` (4 topics: sig + from + to + tokenId)
//! 3. ERC-1155 `TransferSingle` (≥4 topics, tokenId + amount packed in data)
//! 4. ERC-20 `Transfer` (exactly 3 topics: sig + from + to, amount in data)
//! 5. ERC-20 `Approval` (≥3 topics: sig + owner + spender)
//!
//! Anything else decodes to `None` and contributes nothing. Malformed hex
//! coerces to zero; a truncated `TransferSingle` data field falls back to
//! tokenId `"0"` with amount 1.

use alloy_primitives::U256;
use serde_json::Value;

/// `keccak256("Transfer(address,address,uint256)")` — shared by ERC-20 and
/// ERC-721, distinguished by indexed-topic count.
pub const TRANSFER_TOPIC: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// `keccak256("Approval(address,address,uint256)")`
pub const APPROVAL_TOPIC: &str =
    "0x8c5be1e5ebec7d5bd14f71427d1e84f3dd0314c0f7b2291e5b200ac8c7c3b925";

/// `keccak256("TransferSingle(address,address,address,uint256,uint256)")`
pub const ERC1155_TRANSFER_SINGLE_TOPIC: &str =
    "0xc3d58168c5ae7397731d063d5bbf3d657854427343f4c083240f7aacaa2d0f62";

/// `keccak256("Deposit(address,uint256)")` — WETH wrap.
pub const WETH_DEPOSIT_TOPIC: &str =
    "0xe1fffcc4923d04b559f4d29a8bfc6cda04eb5b0d3c460751c2402c5c5cc9109c";

/// `keccak256("Withdrawal(address,uint256)")` — WETH unwrap.
pub const WETH_WITHDRAWAL_TOPIC: &str =
    "0x7fcf532c15f0a6db0bd6d0e038bea71d30d808c7d98cb3bf7268a95bf5081b65";

/// A recognized token event, with addresses lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenEvent {
    /// Wrapped-native deposit: `account` wrapped `amount` of native currency.
    Deposit { account: String, amount: U256 },
    /// Wrapped-native withdrawal: `account` unwrapped `amount`.
    Withdrawal { account: String, amount: U256 },
    /// ERC-721 `Transfer` or ERC-1155 `TransferSingle`.
    NftTransfer {
        from: String,
        to: String,
        token_id: String,
        amount: U256,
    },
    /// Fungible ERC-20 `Transfer`.
    Erc20Transfer {
        from: String,
        to: String,
        amount: U256,
    },
    /// ERC-20 `Approval`.
    Approval { owner: String, spender: String },
}

/// A decoded log: the emitting contract (lowercased) plus the event shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog {
    pub contract: String,
    pub event: TokenEvent,
}

/// Decode one raw receipt log. Returns `None` for logs with no topics or an
/// unrecognized shape — such logs are skipped, never fatal.
pub fn decode_log(log: &Value) -> Option<DecodedLog> {
    let topics: Vec<&str> = log
        .get("topics")?
        .as_array()?
        .iter()
        .map(|t| t.as_str().unwrap_or(""))
        .collect();
    if topics.is_empty() {
        return None;
    }

    let sig = topics[0].to_lowercase();
    let contract = log
        .get("address")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase();
    let data = log.get("data").and_then(Value::as_str).unwrap_or("0x");

    let event = if sig == WETH_DEPOSIT_TOPIC && topics.len() >= 2 {
        TokenEvent::Deposit {
            account: topic_address(topics[1]),
            amount: hex_to_u256(data),
        }
    } else if sig == WETH_WITHDRAWAL_TOPIC && topics.len() >= 2 {
        TokenEvent::Withdrawal {
            account: topic_address(topics[1]),
            amount: hex_to_u256(data),
        }
    } else if sig == TRANSFER_TOPIC && topics.len() == 4 {
        TokenEvent::NftTransfer {
            from: topic_address(topics[1]),
            to: topic_address(topics[2]),
            token_id: hex_to_u256(topics[3]).to_string(),
            amount: U256::from(1),
        }
    } else if sig == ERC1155_TRANSFER_SINGLE_TOPIC && topics.len() >= 4 {
        // topics[1] is the operator; data packs tokenId ++ amount (32 bytes each)
        let (token_id, amount) = decode_erc1155_data(data);
        TokenEvent::NftTransfer {
            from: topic_address(topics[2]),
            to: topic_address(topics[3]),
            token_id,
            amount,
        }
    } else if sig == TRANSFER_TOPIC && topics.len() == 3 {
        TokenEvent::Erc20Transfer {
            from: topic_address(topics[1]),
            to: topic_address(topics[2]),
            amount: hex_to_u256(data),
        }
    } else if sig == APPROVAL_TOPIC && topics.len() >= 3 {
        TokenEvent::Approval {
            owner: topic_address(topics[1]),
            spender: topic_address(topics[2]),
        }
    } else {
        return None;
    };

    Some(DecodedLog { contract, event })
}

/// Extract the address from a 32-byte topic: low 20 bytes, lowercased.
pub fn topic_address(topic: &str) -> String {
    let hex = topic.strip_prefix("0x").unwrap_or(topic);
    let start = hex.len().saturating_sub(40);
    let tail = hex.get(start..).unwrap_or("");
    format!("0x{}", tail.to_lowercase())
}

/// Parse a hex quantity. `"0x"`, empty, and malformed input coerce to zero.
pub fn hex_to_u256(hex_str: &str) -> U256 {
    let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    if stripped.is_empty() {
        return U256::ZERO;
    }
    U256::from_str_radix(stripped, 16).unwrap_or(U256::ZERO)
}

/// `TransferSingle` packs tokenId and amount as two 32-byte words. Anything
/// shorter than the full 130 hex chars (`0x` included) yields the defaults.
fn decode_erc1155_data(data: &str) -> (String, U256) {
    if data.len() >= 130 {
        let token_id = hex_to_u256(data.get(2..66).unwrap_or(""));
        let amount = hex_to_u256(data.get(66..130).unwrap_or(""));
        (token_id.to_string(), amount)
    } else {
        ("0".to_string(), U256::from(1))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pad_address(addr: &str) -> String {
        let hex = addr.strip_prefix("0x").unwrap_or(addr);
        format!("0x{:0>64}", hex)
    }

    fn keccak_topic(signature: &str) -> String {
        use tiny_keccak::{Hasher, Keccak};
        let mut k = Keccak::v256();
        k.update(signature.as_bytes());
        let mut out = [0u8; 32];
        k.finalize(&mut out);
        format!("0x{}", hex::encode(out))
    }

    #[test]
    fn topic_constants_match_signatures() {
        assert_eq!(TRANSFER_TOPIC, keccak_topic("Transfer(address,address,uint256)"));
        assert_eq!(APPROVAL_TOPIC, keccak_topic("Approval(address,address,uint256)"));
        assert_eq!(
            ERC1155_TRANSFER_SINGLE_TOPIC,
            keccak_topic("TransferSingle(address,address,address,uint256,uint256)")
        );
        assert_eq!(WETH_DEPOSIT_TOPIC, keccak_topic("Deposit(address,uint256)"));
        assert_eq!(WETH_WITHDRAWAL_TOPIC, keccak_topic("Withdrawal(address,uint256)"));
    }

    #[test]
    fn topic_address_takes_low_20_bytes() {
        let topic = "0x000000000000000000000000AbCdEf1234567890abcdef1234567890ABCDEF12";
        assert_eq!(topic_address(topic), "0xabcdef1234567890abcdef1234567890abcdef12");
    }

    #[test]
    fn hex_to_u256_coerces_malformed_to_zero() {
        assert_eq!(hex_to_u256("0x"), U256::ZERO);
        assert_eq!(hex_to_u256(""), U256::ZERO);
        assert_eq!(hex_to_u256("0xZZ"), U256::ZERO);
        assert_eq!(hex_to_u256("0x64"), U256::from(100));
    }

    #[test]
    fn decode_erc20_transfer() {
        let log = json!({
            "address": "0x833589FCD6EDB6E08F4C7C32D4F71B54BDA02913",
            "topics": [
                TRANSFER_TOPIC,
                pad_address("0x1111111111111111111111111111111111111111"),
                pad_address("0x2222222222222222222222222222222222222222"),
            ],
            "data": "0x5f5e100",
        });
        let decoded = decode_log(&log).unwrap();
        assert_eq!(decoded.contract, "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913");
        match decoded.event {
            TokenEvent::Erc20Transfer { from, to, amount } => {
                assert_eq!(from, "0x1111111111111111111111111111111111111111");
                assert_eq!(to, "0x2222222222222222222222222222222222222222");
                assert_eq!(amount, U256::from(100_000_000u64));
            }
            other => panic!("expected Erc20Transfer, got {other:?}"),
        }
    }

    #[test]
    fn decode_erc721_transfer_by_topic_count() {
        let log = json!({
            "address": "0xdddddddddddddddddddddddddddddddddddddddd",
            "topics": [
                TRANSFER_TOPIC,
                pad_address("0x1111111111111111111111111111111111111111"),
                pad_address("0x2222222222222222222222222222222222222222"),
                "0x0000000000000000000000000000000000000000000000000000000000000005",
            ],
            "data": "0x",
        });
        match decode_log(&log).unwrap().event {
            TokenEvent::NftTransfer { token_id, amount, .. } => {
                assert_eq!(token_id, "5");
                assert_eq!(amount, U256::from(1));
            }
            other => panic!("expected NftTransfer, got {other:?}"),
        }
    }

    #[test]
    fn decode_erc1155_single_packed_data() {
        let token_id_hex = format!("{:0>64}", "a"); // tokenId = 10
        let amount_hex = format!("{:0>64}", "3"); // amount = 3
        let log = json!({
            "address": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
            "topics": [
                ERC1155_TRANSFER_SINGLE_TOPIC,
                pad_address("0xffffffffffffffffffffffffffffffffffffffff"),
                pad_address("0x1111111111111111111111111111111111111111"),
                pad_address("0x2222222222222222222222222222222222222222"),
            ],
            "data": format!("0x{token_id_hex}{amount_hex}"),
        });
        match decode_log(&log).unwrap().event {
            TokenEvent::NftTransfer { from, to, token_id, amount } => {
                assert_eq!(from, "0x1111111111111111111111111111111111111111");
                assert_eq!(to, "0x2222222222222222222222222222222222222222");
                assert_eq!(token_id, "10");
                assert_eq!(amount, U256::from(3));
            }
            other => panic!("expected NftTransfer, got {other:?}"),
        }
    }

    #[test]
    fn decode_erc1155_truncated_data_defaults() {
        let log = json!({
            "address": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
            "topics": [
                ERC1155_TRANSFER_SINGLE_TOPIC,
                pad_address("0xffffffffffffffffffffffffffffffffffffffff"),
                pad_address("0x1111111111111111111111111111111111111111"),
                pad_address("0x2222222222222222222222222222222222222222"),
            ],
            "data": "0x1234",
        });
        match decode_log(&log).unwrap().event {
            TokenEvent::NftTransfer { token_id, amount, .. } => {
                assert_eq!(token_id, "0");
                assert_eq!(amount, U256::from(1));
            }
            other => panic!("expected NftTransfer, got {other:?}"),
        }
    }

    #[test]
    fn decode_approval() {
        let log = json!({
            "address": "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913",
            "topics": [
                APPROVAL_TOPIC,
                pad_address("0x1111111111111111111111111111111111111111"),
                pad_address("0x2222222222222222222222222222222222222222"),
            ],
            "data": "0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
        });
        match decode_log(&log).unwrap().event {
            TokenEvent::Approval { owner, spender } => {
                assert_eq!(owner, "0x1111111111111111111111111111111111111111");
                assert_eq!(spender, "0x2222222222222222222222222222222222222222");
            }
            other => panic!("expected Approval, got {other:?}"),
        }
    }

    #[test]
    fn no_topics_is_skipped() {
        assert!(decode_log(&json!({"address": "0xabc", "topics": [], "data": "0x"})).is_none());
        assert!(decode_log(&json!({"address": "0xabc"})).is_none());
    }

    #[test]
    fn unknown_signature_is_skipped() {
        let log = json!({
            "address": "0xabc",
            "topics": ["0x0123456701234567012345670123456701234567012345670123456701234567"],
            "data": "0x",
        });
        assert!(decode_log(&log).is_none());
    }

    #[test]
    fn transfer_with_wrong_topic_count_is_skipped() {
        // 2 topics: neither ERC-20 (3) nor ERC-721 (4)
        let log = json!({
            "address": "0xabc",
            "topics": [TRANSFER_TOPIC, pad_address("0x1111111111111111111111111111111111111111")],
            "data": "0x64",
        });
        assert!(decode_log(&log).is_none());
    }
}
