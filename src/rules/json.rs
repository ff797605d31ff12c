//! Shared JSON field parsing/encoding for rule handlers' `from_json`/
//! `to_json`. Kept separate from `loader` so the dependency runs one way:
//! the loader dispatches into individual rule modules, and both sides pull
//! these helpers rather than the loader and the rules depending on each
//! other.

use serde_json::{json, Value};

use crate::error::{Result, SolverError};
use crate::number_set::Number;
use crate::region::{CellIdx, CornerIdx, EdgeIdx, ORCIdx, RCIdx};

fn malformed(rule: &str, reason: impl Into<String>) -> SolverError {
    SolverError::MalformedRegion { rule: rule.to_string(), reason: reason.into() }
}

pub fn field<'a>(fields: &'a Value, key: &str, rule: &str) -> Result<&'a Value> {
    fields.get(key).ok_or_else(|| malformed(rule, format!("missing field '{key}'")))
}

pub fn as_u8(v: &Value, rule: &str, what: &str) -> Result<u8> {
    v.as_u64().map(|n| n as u8).ok_or_else(|| malformed(rule, format!("'{what}' must be a non-negative integer")))
}

pub fn as_i32(v: &Value, rule: &str, what: &str) -> Result<i32> {
    v.as_i64().map(|n| n as i32).ok_or_else(|| malformed(rule, format!("'{what}' must be an integer")))
}

pub fn as_bool(v: &Value, rule: &str, what: &str) -> Result<bool> {
    v.as_bool().ok_or_else(|| malformed(rule, format!("'{what}' must be a boolean")))
}

pub fn as_str<'a>(v: &'a Value, rule: &str, what: &str) -> Result<&'a str> {
    v.as_str().ok_or_else(|| malformed(rule, format!("'{what}' must be a string")))
}

pub fn as_array<'a>(v: &'a Value, rule: &str, what: &str) -> Result<&'a Vec<Value>> {
    v.as_array().ok_or_else(|| malformed(rule, format!("'{what}' must be an array")))
}

pub fn parse_cell(v: &Value, rule: &str) -> Result<CellIdx> {
    let r = as_u8(field(v, "r", rule)?, rule, "r")?;
    let c = as_u8(field(v, "c", rule)?, rule, "c")?;
    Ok(CellIdx::new(r, c))
}

pub fn encode_cell(pos: CellIdx) -> Value {
    json!({ "r": pos.r, "c": pos.c })
}

pub fn parse_cells(v: &Value, rule: &str) -> Result<Vec<CellIdx>> {
    as_array(v, rule, "cells")?.iter().map(|c| parse_cell(c, rule)).collect()
}

pub fn encode_cells(cells: &[CellIdx]) -> Value {
    Value::Array(cells.iter().map(|&c| encode_cell(c)).collect())
}

pub fn parse_paths(v: &Value, rule: &str) -> Result<Vec<Vec<CellIdx>>> {
    as_array(v, rule, "paths")?.iter().map(|p| parse_cells(p, rule)).collect()
}

pub fn encode_paths(paths: &[Vec<CellIdx>]) -> Value {
    Value::Array(paths.iter().map(|p| encode_cells(p)).collect())
}

pub fn parse_corner(v: &Value, rule: &str) -> Result<CornerIdx> {
    let r = as_u8(field(v, "r", rule)?, rule, "r")?;
    let c = as_u8(field(v, "c", rule)?, rule, "c")?;
    Ok(CornerIdx::new(r, c))
}

pub fn encode_corner(corner: CornerIdx) -> Value {
    json!({ "r": corner.r, "c": corner.c })
}

pub fn parse_edge(v: &Value, rule: &str) -> Result<EdgeIdx> {
    let a = parse_cell(field(v, "a", rule)?, rule)?;
    let b = parse_cell(field(v, "b", rule)?, rule)?;
    Ok(EdgeIdx::new(a.r, a.c, b.r, b.c))
}

pub fn encode_edge(edge: EdgeIdx) -> Value {
    json!({ "a": encode_cell(edge.a), "b": encode_cell(edge.b) })
}

pub fn parse_rc(v: &Value, rule: &str) -> Result<RCIdx> {
    let direction = as_str(field(v, "direction", rule)?, rule, "direction")?;
    let index = as_u8(field(v, "index", rule)?, rule, "index")?;
    match direction {
        "row" => Ok(RCIdx::Row(index)),
        "col" => Ok(RCIdx::Col(index)),
        other => Err(malformed(rule, format!("unknown direction '{other}'"))),
    }
}

pub fn encode_rc(rc: RCIdx) -> Value {
    match rc {
        RCIdx::Row(i) => json!({ "direction": "row", "index": i }),
        RCIdx::Col(i) => json!({ "direction": "col", "index": i }),
    }
}

pub fn parse_orc(v: &Value, rule: &str) -> Result<ORCIdx> {
    let rc = parse_rc(v, rule)?;
    let reversed = match v.get("reversed") {
        Some(r) => as_bool(r, rule, "reversed")?,
        None => false,
    };
    Ok(ORCIdx::new(rc, reversed))
}

pub fn encode_orc(orc: ORCIdx) -> Value {
    let mut base = encode_rc(orc.rc);
    base.as_object_mut().unwrap().insert("reversed".to_string(), json!(orc.reversed));
    base
}

pub fn parse_numbers(v: &Value, rule: &str) -> Result<Vec<Number>> {
    as_array(v, rule, "values")?.iter().map(|n| as_u8(n, rule, "value")).collect()
}

pub fn parse_i32s(v: &Value, rule: &str) -> Result<Vec<i32>> {
    as_array(v, rule, "values")?.iter().map(|n| as_i32(n, rule, "value")).collect()
}
