use std::io;

use serde::de::IgnoredAny;
use serde_json::ser::{Formatter, PrettyFormatter};

use crate::model::ResponseRecord;

/// Render a response for the Response pane.
///
/// ```text
/// Status: 200 OK
/// Headers:
///   content-type: application/json
///
/// Body:
/// {
///   "a": 1
/// }
/// ```
///
/// Bodies that parse as JSON are re-indented with two spaces, leaving every
/// token as the server sent it; anything else is copied through byte for byte.
pub fn format_response_bytes(record: &ResponseRecord) -> Vec<u8> {
    let mut out = Vec::with_capacity(record.body.len() + 256);

    out.extend_from_slice(format!("Status: {}\n", record.status_line).as_bytes());
    out.extend_from_slice(b"Headers:\n");
    for (name, values) in &record.headers {
        out.extend_from_slice(format!("  {}: {}\n", name, values.join(", ")).as_bytes());
    }
    out.extend_from_slice(b"\nBody:\n");

    match pretty_json(&record.body) {
        Some(pretty) => out.extend_from_slice(&pretty),
        None => out.extend_from_slice(&record.body),
    }

    out
}

/// [`format_response_bytes`] as pane text. Invalid UTF-8 in a raw body is
/// shown with replacement characters.
pub fn format_response(record: &ResponseRecord) -> String {
    String::from_utf8_lossy(&format_response_bytes(record)).into_owned()
}

fn pretty_json(body: &[u8]) -> Option<Vec<u8>> {
    serde_json::from_slice::<IgnoredAny>(body).ok()?;
    let text = std::str::from_utf8(body).ok()?;
    reindent(text).ok()
}

/// Open container while re-indenting.
enum Nesting {
    Object { first: bool, expect_key: bool },
    Array { first: bool },
}

/// Lay out validated JSON with two-space indentation. Only whitespace
/// changes: numbers, string escapes and repeated keys are copied as sent.
fn reindent(text: &str) -> io::Result<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() * 2);
    let mut fmt = PrettyFormatter::with_indent(b"  ");
    let mut stack: Vec<Nesting> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            // Separators are re-emitted by the formatter
            b' ' | b'\t' | b'\n' | b'\r' | b',' | b':' => i += 1,
            b'{' => {
                begin_value(&mut fmt, &mut out, &mut stack)?;
                fmt.begin_object(&mut out)?;
                stack.push(Nesting::Object {
                    first: true,
                    expect_key: true,
                });
                i += 1;
            }
            b'[' => {
                begin_value(&mut fmt, &mut out, &mut stack)?;
                fmt.begin_array(&mut out)?;
                stack.push(Nesting::Array { first: true });
                i += 1;
            }
            b'}' => {
                stack.pop();
                fmt.end_object(&mut out)?;
                end_value(&mut fmt, &mut out, &mut stack)?;
                i += 1;
            }
            b']' => {
                stack.pop();
                fmt.end_array(&mut out)?;
                end_value(&mut fmt, &mut out, &mut stack)?;
                i += 1;
            }
            b'"' => {
                let end = string_end(bytes, i);
                let token = &text[i..end];
                let is_key = matches!(
                    stack.last(),
                    Some(Nesting::Object {
                        expect_key: true,
                        ..
                    })
                );
                if is_key {
                    if let Some(Nesting::Object { first, expect_key }) = stack.last_mut() {
                        fmt.begin_object_key(&mut out, *first)?;
                        fmt.write_raw_fragment(&mut out, token)?;
                        fmt.end_object_key(&mut out)?;
                        *first = false;
                        *expect_key = false;
                    }
                } else {
                    write_scalar(&mut fmt, &mut out, &mut stack, token)?;
                }
                i = end;
            }
            _ => {
                let end = scalar_end(bytes, i);
                write_scalar(&mut fmt, &mut out, &mut stack, &text[i..end])?;
                i = end;
            }
        }
    }

    Ok(out)
}

fn begin_value(
    fmt: &mut PrettyFormatter<'_>,
    out: &mut Vec<u8>,
    stack: &mut [Nesting],
) -> io::Result<()> {
    match stack.last_mut() {
        Some(Nesting::Array { first }) => {
            fmt.begin_array_value(out, *first)?;
            *first = false;
        }
        Some(Nesting::Object { .. }) => fmt.begin_object_value(out)?,
        None => {}
    }
    Ok(())
}

fn end_value(
    fmt: &mut PrettyFormatter<'_>,
    out: &mut Vec<u8>,
    stack: &mut [Nesting],
) -> io::Result<()> {
    match stack.last_mut() {
        Some(Nesting::Array { .. }) => fmt.end_array_value(out)?,
        Some(Nesting::Object { expect_key, .. }) => {
            fmt.end_object_value(out)?;
            *expect_key = true;
        }
        None => {}
    }
    Ok(())
}

fn write_scalar(
    fmt: &mut PrettyFormatter<'_>,
    out: &mut Vec<u8>,
    stack: &mut [Nesting],
    token: &str,
) -> io::Result<()> {
    begin_value(fmt, out, stack)?;
    fmt.write_raw_fragment(out, token)?;
    end_value(fmt, out, stack)
}

/// Index just past the closing quote of the string starting at `start`.
fn string_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Index just past a number or literal starting at `start`.
fn scalar_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|&b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b',' | b']' | b'}'))
        .map_or(bytes.len(), |n| start + n)
}
