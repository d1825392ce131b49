//! Test doubles shared with downstream crates (enable the `tests` feature)
