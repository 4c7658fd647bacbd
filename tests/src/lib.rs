//! Intentionally empty: this member exists for its `tests/` targets.
