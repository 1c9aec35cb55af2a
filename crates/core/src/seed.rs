//! Starter study spaces inserted on first startup

use tracing::{info, instrument};

use crate::error::Result;
use crate::invariants::assert_space_invariants;
use crate::models::{SpaceType, StudySpace};
use crate::storage::SpaceRepository;

/// Name, location, capacity, type
pub const DEFAULT_SPACES: &[(&str, &str, u32, SpaceType)] = &[
    ("Library Zone A", "Main Library, 2nd Floor", 20, SpaceType::Silent),
    ("Group Study Room 1", "Academic Block, Room 101", 8, SpaceType::Discussion),
    ("Open Study Hall", "Student Center", 50, SpaceType::Open),
    ("Library Zone B", "Main Library, 3rd Floor", 15, SpaceType::Silent),
    ("Seminar Room 2", "Academic Block, Room 205", 12, SpaceType::Discussion),
];

/// Insert the default spaces if the space table is empty.
///
/// Returns the number of spaces inserted; zero when spaces already exist.
#[instrument(skip(store))]
pub fn seed_spaces<S: SpaceRepository + ?Sized>(store: &S) -> Result<usize> {
    let existing = store.count_spaces()?;
    if existing > 0 {
        info!(existing, "Study spaces already exist, skipping seed");
        return Ok(0);
    }

    for (name, location, capacity, space_type) in DEFAULT_SPACES {
        let space = StudySpace::new(name, location, *capacity, *space_type);
        assert_space_invariants(&space);
        store.create_space(&space)?;
    }

    info!(count = DEFAULT_SPACES.len(), "Default study spaces inserted");
    Ok(DEFAULT_SPACES.len())
}
