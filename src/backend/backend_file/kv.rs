use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, ErrorKind, Read, Write};

use log::error;

use super::FindError;

pub type KeyValues = HashMap<String, String>;

pub fn read(input: impl Read) -> Result<KeyValues, FindError> {
    let mut kv = HashMap::new();

    for line in BufReader::new(input).lines() {
        let line = line.map_err(|e| {
            error!("couldn't read line: {e}");
            FindError::Internal
        })?;

        let (k, v) = line.split_once(':').ok_or_else(|| {
            error!("invalid line, can't split");
            FindError::Internal
        })?;

        let Some(v) = v.strip_prefix(' ') else {
            error!("invalid line - no whitespace after colon");
            return Err(FindError::Internal);
        };
        kv.insert(k.into(), v.into());
    }

    Ok(kv)
}

pub fn write(mut output: impl Write, keyvalues: &KeyValues) -> Result<(), io::Error> {
    for (k, v) in keyvalues {
        if k.contains(':') || has_line_break(k) || has_line_break(v) {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("unrepresentable entry for key {k:?}"),
            ));
        }
    }

    for (k, v) in keyvalues {
        writeln!(output, "{}: {}", k, v)?;
    }
    output.flush()
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\n', '\r'])
}
