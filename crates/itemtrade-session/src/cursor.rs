/// Protocol cursor: trade `version` and event-log position.
///
/// Neither field ever decreases; `advance` keeps the larger of each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradeCursor {
    version: u32,
    log_pos: u32,
}

impl TradeCursor {
    pub fn new(version: u32, log_pos: u32) -> Self {
        Self { version, log_pos }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn log_pos(&self) -> u32 {
        self.log_pos
    }

    pub fn advance(&mut self, next: TradeCursor) {
        self.version = self.version.max(next.version);
        self.log_pos = self.log_pos.max(next.log_pos);
    }

    pub fn with_version(self, version: u32) -> Self {
        Self { version, ..self }
    }

    pub fn with_log_pos(self, log_pos: u32) -> Self {
        Self { log_pos, ..self }
    }
}
