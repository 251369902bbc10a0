use crate::error::TlvResult;
use crate::reader::{ElementKind, TlvReader};
use std::fmt::Write;

/// Renders a TLV encoding as indented text, one element per line.
///
/// ```text
/// structure anonymous {
///   [1] unsigned integer = 7
///   [2] boolean = false
/// }
/// ```
pub fn pretty_print(data: &[u8]) -> TlvResult<String> {
    let mut reader = TlvReader::new(data);
    let mut out = String::new();
    print_level(&mut reader, &mut out, 0)?;
    reader.expect_end()?;
    Ok(out)
}

fn print_level(reader: &mut TlvReader<'_>, out: &mut String, indent: usize) -> TlvResult<()> {
    while let Some(element) = reader.next()? {
        let pad = "  ".repeat(indent);
        let tag = element.tag;
        // Writing into a String cannot fail.
        let _ = match element.kind {
            ElementKind::Container(container) => {
                let _ = writeln!(out, "{pad}{container} {tag} {{");
                reader.enter_container()?;
                print_level(reader, out, indent + 1)?;
                reader.exit_container()?;
                writeln!(out, "{pad}}}")
            }
            ElementKind::Signed(v) => writeln!(out, "{pad}{tag} signed integer = {v}"),
            ElementKind::Unsigned(v) => writeln!(out, "{pad}{tag} unsigned integer = {v}"),
            ElementKind::Bool(v) => writeln!(out, "{pad}{tag} boolean = {v}"),
            ElementKind::Float(v) => writeln!(out, "{pad}{tag} float = {v}"),
            ElementKind::Utf8(v) => writeln!(out, "{pad}{tag} string = {v:?}"),
            ElementKind::Bytes(v) => {
                let hex: String = v.iter().map(|b| format!("{b:02x}")).collect();
                writeln!(out, "{pad}{tag} bytes[{}] = {hex}", v.len())
            }
            ElementKind::Null => writeln!(out, "{pad}{tag} null"),
        };
    }
    Ok(())
}
