//! Text artifact emission.
//!
//! Renders the complete generated surface as one deterministic text
//! document: the closed known-header enumeration, one dictionary body per
//! direction (accessor table, matcher cascade, HPACK dispatch for requests,
//! wire byte table for serialized directions) and the invalid-under-H2/H3
//! response mask. Formatting carries no contract beyond determinism; two
//! renders in the same build are byte-identical.

use std::fmt::Write;

use crate::registry::{order, Direction, REGISTRY};

use super::{plan_for, DirectionPlan};

/// Renders the whole artifact.
pub fn render() -> String {
    let mut out = String::new();
    out.push_str("known-headers generated surface\n");
    out.push_str("===============================\n\n");

    render_types(&mut out);
    for direction in [Direction::Request, Direction::Response, Direction::Trailers] {
        render_direction(&mut out, plan_for(direction));
    }

    let response = plan_for(Direction::Response);
    writeln!(
        out,
        "const INVALID_H2H3_RESPONSE_HEADERS_BITS: u64 = {:#018x}; // {}",
        response.invalid_h2h3_bits(),
        mask_names(response, response.invalid_h2h3_bits())
    )
    .unwrap();
    out
}

/// `Unknown` plus one entry per unique identifier, in invariant order.
fn render_types(out: &mut String) {
    let mut identifiers: Vec<&'static str> = REGISTRY.iter().map(|d| d.known.identifier()).collect();
    identifiers.sort_by(|a, b| order::invariant_cmp(a, b));
    identifiers.dedup();

    out.push_str("enum KnownHeaderType {\n    Unknown,\n");
    for identifier in identifiers {
        writeln!(out, "    {identifier},").unwrap();
    }
    out.push_str("}\n\n");
}

fn render_direction(out: &mut String, plan: &DirectionPlan) {
    let tag = match plan.direction() {
        Direction::Request => "request",
        Direction::Response => "response",
        Direction::Trailers => "trailers",
    };
    writeln!(out, "dictionary {tag} ({} headers) {{", plan.headers().len()).unwrap();

    for header in plan.headers() {
        match header.index {
            Some(i) => write!(out, "    bit {i:>2}  {:<28}", header.known().identifier()).unwrap(),
            None => write!(out, "    bit  -  {:<28}", header.known().identifier()).unwrap(),
        }
        write!(out, " {:?}", header.name()).unwrap();
        if let Some(slice) = header.wire {
            write!(out, "  wire {}+{}", slice.offset, slice.len).unwrap();
        }
        let flags = flag_tokens(header.def);
        if !flags.is_empty() {
            write!(out, "  [{}]", flags.join(" ")).unwrap();
        }
        out.push('\n');
    }

    out.push_str("    matcher {\n");
    for bucket in plan.matcher().buckets() {
        for group in &bucket.groups {
            write!(
                out,
                "        len {:>2} lead @{} w{} {:#018x}/{:#018x}:",
                bucket.len, group.lead.offset, group.lead.width, group.lead.mask, group.lead.comparand
            )
            .unwrap();
            for candidate in &group.candidates {
                write!(out, " {}", plan.header_at(candidate.header).known().identifier()).unwrap();
            }
            out.push('\n');
        }
    }
    out.push_str("    }\n");

    if let Some(dispatch) = plan.hpack() {
        out.push_str("    hpack dispatch {\n");
        for group in dispatch.groups() {
            let indices: Vec<String> = group.indices.iter().map(u8::to_string).collect();
            let target = match group.header {
                Some(position) => plan.header_at(position).known().identifier(),
                None => "-",
            };
            writeln!(out, "        [{}] {} -> {}", indices.join(" "), group.name, target).unwrap();
        }
        out.push_str("    }\n");
    }

    if !plan.wire_blob().is_empty() {
        writeln!(
            out,
            "    wire blob ({} bytes) \"{}\"",
            plan.wire_blob().len(),
            plan.wire_blob().escape_ascii()
        )
        .unwrap();
    }

    out.push_str("}\n\n");
}

fn flag_tokens(def: &crate::registry::HeaderDef) -> Vec<&'static str> {
    use crate::registry::flags;
    let mut tokens = Vec::new();
    if def.flags & flags::PRIMARY != 0 {
        tokens.push("primary");
    }
    if def.flags & flags::EXISTENCE_CHECK != 0 {
        tokens.push("existence-check");
    }
    if def.flags & flags::FAST_COUNT != 0 {
        tokens.push("fast-count");
    }
    if def.flags & flags::ENHANCED_SETTER != 0 {
        tokens.push("enhanced-setter");
    }
    if def.flags & flags::PSEUDO != 0 {
        tokens.push("pseudo");
    }
    if def.flags & flags::INVALID_H2H3 != 0 {
        tokens.push("invalid-h2h3");
    }
    tokens
}

fn mask_names(plan: &DirectionPlan, mask: u64) -> String {
    let mut names = Vec::new();
    let mut remaining = mask;
    while remaining != 0 {
        let index = remaining.trailing_zeros() as usize;
        remaining &= remaining - 1;
        names.push(plan.header_at(index).name());
    }
    names.join(", ")
}
