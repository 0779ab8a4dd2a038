use crate::db::KeyValueStore;

const PERMISSION_KEY: &str = "adhan_permission";

/// The one-time answer to "play the adhan automatically?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Granted => "granted",
            Permission::Denied => "denied",
        }
    }

    /// `None` means the user has not been asked yet.
    pub fn load(store: &dyn KeyValueStore) -> Option<Permission> {
        match store.get(PERMISSION_KEY) {
            Ok(Some(value)) => match value.as_str() {
                "granted" => Some(Permission::Granted),
                "denied" => Some(Permission::Denied),
                other => {
                    log::warn!("Ignoring unknown adhan permission '{}'", other);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("Could not read adhan permission: {:#}", e);
                None
            }
        }
    }

    pub fn save(self, store: &dyn KeyValueStore) {
        if let Err(e) = store.set(PERMISSION_KEY, self.as_str()) {
            log::warn!("Could not persist adhan permission: {:#}", e);
        }
    }
}
