mod linspace;

pub(crate) use linspace::{linspace, lerp_percent};
