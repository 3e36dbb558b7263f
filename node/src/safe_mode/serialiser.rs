//! Writes a [`SafeModeResult`] to JSON in the stable, externally-consumed
//! schema clients of the `getStatus` RPC and the status webhook both rely on.

use super::error::SafeModeError;
use super::result::SafeModeResult;
use super::types::{compare_block_refs, BlockRef, ChainView};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

/// `status` field of a `BlockObj`, derived by first match.
fn status_string<C: ChainView>(chain: &C, block: &C::Ref) -> &'static str {
    if chain.contains(block) {
        "active"
    } else if block.status().invalid {
        "invalid"
    } else if block.chain_tx() == 0 {
        "headers-only"
    } else if block.status().scripts_valid {
        "valid-fork"
    } else if block.status().tree_valid {
        "valid-headers"
    } else {
        "unknown"
    }
}

fn format_time(unix_secs: u64) -> String {
    Utc.timestamp_opt(unix_secs as i64, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| "1970-01-01T00:00:00Z".to_string())
}

fn block_obj<C: ChainView>(chain: &C, block: Option<&C::Ref>) -> Value {
    match block {
        None => json!({}),
        Some(b) => json!({
            "hash": hex::encode(b.block_hash()),
            "height": b.height(),
            "blocktime": format_time(b.block_time()),
            "firstseentime": format_time(b.header_received_time()),
            "status": status_string(chain, b),
        }),
    }
}

/// Serialise `result` to the schema's `serde_json::Value` tree. `chain` is
/// used only to derive each block's `status` field and the
/// `activechainfirstblock` successor lookup; it is not otherwise part of
/// the result.
pub fn to_json<C: ChainView>(chain: &C, result: &SafeModeResult<C::Ref>) -> Value {
    let mut forks: Vec<_> = result.forks().collect();
    forks.sort_by(|a, b| compare_block_refs(&a.base, &b.base));

    let forks_json: Vec<Value> = forks
        .iter()
        .map(|fork| {
            let mut tips: Vec<_> = fork.tips.iter().collect();
            tips.sort_by(|a, b| compare_block_refs(a, b));

            let last_common = fork.base.parent();
            let active_chain_first = last_common.as_ref().and_then(|p| chain.next(p));

            json!({
                "forkfirstblock": block_obj(chain, Some(&fork.base)),
                "tips": tips.iter().map(|t| block_obj(chain, Some(t))).collect::<Vec<_>>(),
                "lastcommonblock": block_obj(chain, last_common.as_ref()),
                "activechainfirstblock": block_obj(chain, active_chain_first.as_ref()),
            })
        })
        .collect();

    json!({
        "safemodeenabled": result.max_level != super::types::SafeModeLevel::None,
        "activetip": block_obj(chain, result.active_tip.as_ref()),
        "timeutc": format_time(current_unix_time()),
        "forks": forks_json,
    })
}

/// Wraps `SystemTime::now()` so it's a single seam to swap in tests if
/// `timeutc` ever needs to be pinned.
fn current_unix_time() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Compact form with a trailing CRLF, as required for webhook bodies.
pub fn to_webhook_body<C: ChainView>(chain: &C, result: &SafeModeResult<C::Ref>) -> String {
    let mut body = serde_json::to_string(&to_json(chain, result)).unwrap_or_default();
    body.push_str("\r\n");
    body
}

/// Pretty-printed form for `getStatus` callers that want a `Result` rather
/// than the infallible `Value` tree (e.g. an RPC handler returning a JSON
/// body directly). The only failure mode is a `Value` that can't round-trip
/// through `serde_json`, which shouldn't happen for a tree built entirely
/// from `json!` macros.
pub fn to_json_string<C: ChainView>(
    chain: &C,
    result: &SafeModeResult<C::Ref>,
) -> Result<String, SafeModeError> {
    Ok(serde_json::to_string_pretty(&to_json(chain, result))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safe_mode::block_index::BlockIndex;
    use crate::safe_mode::result::ResultBuilder;
    use crate::safe_mode::types::{BlockStatus, SafeModeLevel};

    fn hash(n: u8) -> [u8; 32] {
        let mut h = [0u8; 32];
        h[0] = n;
        h
    }

    #[test]
    fn empty_result_has_false_safemodeenabled_and_empty_forks() {
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let result = ResultBuilder::new(Some(genesis)).build();
        let value = to_json(&idx, &result);
        assert_eq!(value["safemodeenabled"], json!(false));
        assert_eq!(value["forks"], json!([]));
    }

    #[test]
    fn fork_with_tips_has_expected_shape() {
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let a1 = idx.insert_block(hash(1), &genesis, 1, 1010, BlockStatus::valid(), 1);
        idx.set_active_tip(&a1);
        let f1 = idx.insert_block(hash(2), &genesis, 1, 1011, BlockStatus::valid(), 1);

        let mut builder = ResultBuilder::new(Some(a1));
        builder.add_fork(f1.clone(), genesis.clone(), SafeModeLevel::Valid);
        let result = builder.build();

        let value = to_json(&idx, &result);
        assert_eq!(value["safemodeenabled"], json!(true));
        let fork = &value["forks"][0];
        assert_eq!(fork["forkfirstblock"]["status"], json!("active"));
        assert_eq!(fork["tips"][0]["hash"], json!(hex::encode(hash(2))));
        assert_eq!(fork["activechainfirstblock"]["status"], json!("active"));
    }

    #[test]
    fn webhook_body_ends_with_crlf() {
        let idx = BlockIndex::new();
        let genesis = idx.insert_genesis(hash(0), 1000);
        let result = ResultBuilder::new(Some(genesis)).build();
        let body = to_webhook_body(&idx, &result);
        assert!(body.ends_with("\r\n"));
    }
}
