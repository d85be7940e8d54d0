/// Assignee of an error group. Groups can be assigned to a person or to a
/// whole team; the alert payload only carries a display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Actor {
    User { name: Option<String>, email: String },
    Team { slug: String },
}

impl Actor {
    pub fn display_name(&self) -> String {
        match self {
            Self::User { name: Some(name), .. } => name.clone(),
            Self::User { name: None, email } => email.clone(),
            Self::Team { slug } => slug.clone(),
        }
    }
}
