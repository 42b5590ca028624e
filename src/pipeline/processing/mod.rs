// Core table transforms: term resolution, tenure ranking, filtering and renaming

pub mod current;
pub mod names;
pub mod ranking;
pub mod tenure;
pub mod terms;

pub use current::only_current;
pub use names::{normalize_name, normalize_names};
pub use tenure::add_tenure;
pub use terms::{normalize_term, normalize_terms};
