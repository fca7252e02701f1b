//! The built-in block palette.
//!
//! Placed nodes copy their port lists from these definitions at drop time,
//! so editing the palette never mutates an already-saved flow.

use crate::types::{BlockDef, Port, ENTRY_CODE_ID};
use once_cell::sync::Lazy;

static BLOCKS: Lazy<Vec<BlockDef>> = Lazy::new(|| {
    vec![
        BlockDef {
            code_id: ENTRY_CODE_ID.to_string(),
            label: "Start Command".to_string(),
            doc: "Entry point of the flow. Runs when the named command is invoked.".to_string(),
            inputs: vec![],
            outputs: vec![Port::new("ctx", "any").desc("Invocation context")],
        },
        BlockDef {
            code_id: "random_number".to_string(),
            label: "Random Number".to_string(),
            doc: "Picks a whole number between low and high, inclusive.".to_string(),
            inputs: vec![
                Port::new("low", "number").desc("Lowest possible value"),
                Port::new("high", "number").desc("Highest possible value"),
            ],
            outputs: vec![Port::new("output", "number").desc("The picked number")],
        },
        BlockDef {
            code_id: "send_message".to_string(),
            label: "Send Message".to_string(),
            doc: "Sends a message to a channel.".to_string(),
            inputs: vec![
                Port::new("ctx", "any").desc("Invocation context"),
                Port::new("channel_id", "number").desc("Channel to post in"),
                Port::new("text", "string").desc("Message body"),
            ],
            outputs: vec![Port::new("output", "void")],
        },
        BlockDef {
            code_id: "reply".to_string(),
            label: "Reply".to_string(),
            doc: "Replies to the invoking command.".to_string(),
            inputs: vec![
                Port::new("ctx", "any").desc("Invocation context"),
                Port::new("text", "string").desc("Reply body"),
            ],
            outputs: vec![Port::new("output", "void")],
        },
        BlockDef {
            code_id: "concat_text".to_string(),
            label: "Concat Text".to_string(),
            doc: "Joins two pieces of text.".to_string(),
            inputs: vec![
                Port::new("a", "string").desc("First part"),
                Port::new("b", "string").desc("Second part"),
            ],
            outputs: vec![Port::new("output", "string").desc("a followed by b")],
        },
        BlockDef {
            code_id: "number_to_text".to_string(),
            label: "Number To Text".to_string(),
            doc: "Formats a number as text.".to_string(),
            inputs: vec![Port::new("value", "number").desc("Number to format")],
            outputs: vec![Port::new("output", "string").desc("The formatted text")],
        },
    ]
});

/// All built-in block definitions, entry block first.
pub fn builtin_blocks() -> &'static [BlockDef] {
    &BLOCKS
}

/// The singleton entry definition.
pub fn entry_def() -> &'static BlockDef {
    &BLOCKS[0]
}

/// Looks up a definition by its `code_id`.
pub fn find_block(code_id: &str) -> Option<&'static BlockDef> {
    BLOCKS.iter().find(|d| d.code_id == code_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_exactly_one_entry_definition() {
        let entries = builtin_blocks().iter().filter(|d| d.is_entry()).count();
        assert_eq!(entries, 1);
        assert!(entry_def().is_entry());
    }

    #[test]
    fn code_ids_are_unique() {
        let mut ids: Vec<_> = builtin_blocks().iter().map(|d| &d.code_id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), builtin_blocks().len());
    }

    #[test]
    fn void_outputs_are_not_rendered_as_sockets() {
        let send = find_block("send_message").unwrap();
        assert!(send.outputs.iter().all(|p| !p.carries_value()));
    }
}
