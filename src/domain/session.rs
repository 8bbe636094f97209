// Per-export identity allocation.

/// Mutable state owned by exactly one export call.
///
/// Node and edge counters are independent and both start at zero, so ids depend
/// only on visit rank. A session is created per export and never shared between
/// threads.
#[derive(Debug, Default)]
pub struct ExportSession {
    node_counter: usize,
    edge_counter: usize,
}

impl ExportSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// `n0`, `n1`, ...
    pub fn next_node_id(&mut self) -> String {
        let id = format!("n{}", self.node_counter);
        self.node_counter += 1;
        id
    }

    /// `e0`, `e1`, ...
    pub fn next_edge_id(&mut self) -> String {
        let id = format!("e{}", self.edge_counter);
        self.edge_counter += 1;
        id
    }
}
