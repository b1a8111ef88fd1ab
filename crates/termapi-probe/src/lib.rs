#![forbid(unsafe_code)]

//! Probe: query the terminal and print the answer with a message tag.

pub mod cli;

use std::io::{self, Write};

use termapi::{CursorQuery, InputChannel, MessageKind, MessagePrinter, OutputChannel, QueryError};

/// Run the query selected by `attributes` and report the outcome on `report`.
///
/// Success prints `[MSG] row col` (or the attribute codes); failure prints
/// `[ERROR] <stage> failed: ...`. Returns whether the query succeeded.
pub fn probe<O, I, W>(
    query: &mut CursorQuery<O, I>,
    attributes: bool,
    printer: &MessagePrinter,
    report: &mut W,
) -> io::Result<bool>
where
    O: OutputChannel,
    I: InputChannel,
    W: Write + ?Sized,
{
    let outcome: Result<String, QueryError> = if attributes {
        query.device_attributes().map(|attrs| {
            attrs
                .codes
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(";")
        })
    } else {
        query
            .cursor_position()
            .map(|pos| format!("{} {}", pos.row, pos.col))
    };

    match outcome {
        Ok(text) => {
            printer.write_line(report, MessageKind::Msg, text)?;
            Ok(true)
        }
        Err(err) => {
            tracing::debug!(stage = %err.stage(), "probe failed");
            printer.write_line(report, MessageKind::Error, &err)?;
            Ok(false)
        }
    }
}
