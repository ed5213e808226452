/// Most-recent-wins live preview driven by store changes.
pub mod preview;
