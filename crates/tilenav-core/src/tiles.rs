//! Tile classification: [`TileClass`] and [`TileCell`].

/// An opaque tile-type identifier.
///
/// The value is whatever the map collaborator uses to distinguish tile
/// types — typically a raw tileset index. This crate never interprets it;
/// it only serves as the key for traversal-cost lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileClass(pub u32);

impl TileClass {
    /// Create a new class from a raw identifier.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the underlying identifier.
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl From<u32> for TileClass {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<TileClass> for u32 {
    fn from(c: TileClass) -> Self {
        c.0
    }
}

/// One cell of a [`TraversalGrid`](crate::TraversalGrid).
///
/// `class == None` marks a cell where the base layer reported no tile:
/// such a cell is open with no class of its own, and costs the default
/// amount to cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileCell {
    /// Tile type recorded for the cell, if any.
    pub class: Option<TileClass>,
    /// Whether the cell can be entered at all.
    pub blocked: bool,
}

impl TileCell {
    /// An open cell carrying no class.
    pub const OPEN: Self = Self {
        class: None,
        blocked: false,
    };

    /// An open cell of the given class.
    pub const fn open(class: TileClass) -> Self {
        Self {
            class: Some(class),
            blocked: false,
        }
    }

    /// A blocked cell of the given class.
    pub const fn blocked(class: TileClass) -> Self {
        Self {
            class: Some(class),
            blocked: true,
        }
    }
}
