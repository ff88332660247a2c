pub use self::{geom::*, kick::*, piece::*, playfield::*, rotation::*};

pub(crate) mod geom;
pub(crate) mod kick;
pub(crate) mod piece;
pub(crate) mod playfield;
pub(crate) mod rotation;
