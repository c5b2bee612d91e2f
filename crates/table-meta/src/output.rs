use std::io::Write;

use serde::Serialize;

use crate::{core::types::Engine, error::{MetaError, MetaResult}};

/// One line of CLI output.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<Engine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl Envelope {
    pub fn ok(engine: Engine, data: serde_json::Value) -> Self {
        Self {
            status: "ok",
            engine: Some(engine),
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn err(e: &MetaError) -> Self {
        Self {
            status: "error",
            engine: None,
            data: None,
            error: Some(e.to_string()),
            code: Some(e.code()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

pub fn write_json_line<W: Write, T: Serialize>(out: &mut W, v: &T) -> MetaResult<()> {
    serde_json::to_writer(&mut *out, v)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}
