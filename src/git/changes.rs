//! Working-tree change classification from porcelain status output

/// Category a changed file falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Modified,
    Untracked,
    Staged,
    Deleted,
}

impl ChangeKind {
    fn label(self) -> &'static str {
        match self {
            ChangeKind::Modified => "Modified",
            ChangeKind::Untracked => "Untracked",
            ChangeKind::Staged => "Staged",
            ChangeKind::Deleted => "Deleted",
        }
    }

    /// Classifies a two-letter porcelain `XY` code
    ///
    /// Index changes win over worktree changes, so a file both staged and then edited
    /// again counts as staged.
    pub fn from_code(index: u8, worktree: u8) -> Self {
        match (index, worktree) {
            (b'?', b'?') => ChangeKind::Untracked,
            (b' ', b'D') => ChangeKind::Deleted,
            (b' ', _) => ChangeKind::Modified,
            _ => ChangeKind::Staged,
        }
    }
}

/// Changed files of one repository grouped by category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub modified: Vec<String>,
    pub untracked: Vec<String>,
    pub staged: Vec<String>,
    pub deleted: Vec<String>,
}

impl ChangeSet {
    /// Parses `git status --porcelain=v1 -z` output
    pub fn from_porcelain(raw: &[u8]) -> Self {
        let mut changes = ChangeSet::default();
        let mut entries = raw.split(|b| *b == 0).filter(|entry| !entry.is_empty());

        while let Some(entry) = entries.next() {
            if entry.len() < 4 {
                continue;
            }
            let (index, worktree) = (entry[0], entry[1]);
            if index == b'!' {
                continue;
            }
            let file = String::from_utf8_lossy(&entry[3..]).into_owned();
            // Renames and copies carry their source path as a separate entry
            if matches!(index, b'R' | b'C') {
                entries.next();
            }
            changes.push(ChangeKind::from_code(index, worktree), file);
        }

        changes
    }

    fn push(&mut self, kind: ChangeKind, file: String) {
        match kind {
            ChangeKind::Modified => self.modified.push(file),
            ChangeKind::Untracked => self.untracked.push(file),
            ChangeKind::Staged => self.staged.push(file),
            ChangeKind::Deleted => self.deleted.push(file),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.modified.len() + self.untracked.len() + self.staged.len() + self.deleted.len()
    }

    /// Human-readable listing per category, each truncated to `cap` files
    pub fn report_lines(&self, cap: usize) -> Vec<String> {
        [
            (ChangeKind::Modified, &self.modified),
            (ChangeKind::Untracked, &self.untracked),
            (ChangeKind::Staged, &self.staged),
            (ChangeKind::Deleted, &self.deleted),
        ]
        .into_iter()
        .filter(|(_, files)| !files.is_empty())
        .map(|(kind, files)| {
            let shown = files.iter().take(cap).cloned().collect::<Vec<_>>().join(", ");
            let mut line = format!("{} files ({}): {}", kind.label(), files.len(), shown);
            if files.len() > cap {
                line.push_str(&format!(" (+{} more)", files.len() - cap));
            }
            line
        })
        .collect()
    }
}
