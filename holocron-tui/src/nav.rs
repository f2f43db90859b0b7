//! Navigation and view switching utilities.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    People,
    Species,
    Profile,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::People => "People",
            View::Species => "Species",
            View::Profile => "Profile",
        }
    }

    pub fn all() -> &'static [View] {
        &[View::People, View::Species, View::Profile]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let all = Self::all();
        let idx = self.index();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}
