//! Code-node accumulation.

use glaze_ir::{Block, Handle, Value};

/// Builds instruction sequences as a stack of open code nodes.
///
/// The top node is "current": [`insert`](Self::insert) appends to it.
/// Structured control flow opens a nested node, fills it, and pops it
/// into the owning instruction. The writer knows nothing about what
/// the instructions mean.
#[derive(Debug, Default)]
pub(crate) struct CodeWriter {
    nodes: Vec<Block>,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a fresh empty node; it becomes current.
    pub fn push_node(&mut self) {
        self.nodes.push(Block::new());
    }

    /// Closes the current node and returns it.
    pub fn pop_node(&mut self) -> Block {
        self.nodes.pop().expect("code node stack underflow")
    }

    /// Appends an instruction to the current node.
    pub fn insert(&mut self, instr: Handle<Value>) {
        self.nodes
            .last_mut()
            .expect("no open code node to insert into")
            .push(instr);
    }

    /// Returns `true` while any node is open. Top-level variable
    /// lowering uses this to redirect allocations to globals.
    pub fn has_current(&self) -> bool {
        !self.nodes.is_empty()
    }

    /// Number of open nodes.
    pub fn depth(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glaze_ir::{Arena, ScalarKind, Type, TypeInner, ValueKind};

    fn instr(values: &mut Arena<Value>, types: &mut Arena<Type>) -> Handle<Value> {
        let ty = types.append(Type {
            name: None,
            inner: TypeInner::Scalar(ScalarKind::Void),
        });
        values.append(Value::new(ty, ValueKind::Discard))
    }

    #[test]
    fn nested_nodes_accumulate_independently() {
        let mut types = Arena::new();
        let mut values = Arena::new();
        let outer_instr = instr(&mut values, &mut types);
        let inner_instr = instr(&mut values, &mut types);

        let mut writer = CodeWriter::new();
        writer.push_node();
        writer.insert(outer_instr);
        writer.push_node();
        writer.insert(inner_instr);
        let inner = writer.pop_node();
        assert_eq!(inner, vec![inner_instr]);
        let outer = writer.pop_node();
        assert_eq!(outer, vec![outer_instr]);
        assert!(!writer.has_current());
    }

    #[test]
    fn has_current_tracks_open_nodes() {
        let mut writer = CodeWriter::new();
        assert!(!writer.has_current());
        writer.push_node();
        assert!(writer.has_current());
        assert_eq!(writer.depth(), 1);
        writer.pop_node();
        assert!(!writer.has_current());
    }

    #[test]
    #[should_panic(expected = "code node stack underflow")]
    fn unbalanced_pop_panics() {
        let mut writer = CodeWriter::new();
        writer.pop_node();
    }
}
