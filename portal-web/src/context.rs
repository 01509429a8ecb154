//! The portal's collaborators, built once at startup and shared through a
//! Yew context.

use crate::{
    api::{RestDocumentStore, RestIdentityProvider},
    storage::BrowserStorage,
};
use shared::{
    accounts::AccountService,
    activity::ActivityFeed,
    admin::AdminService,
    calendar::CalendarService,
    config::PortalConfig,
    directory::DirectoryService,
    services::{DocumentStore, KeyValueStore},
    session::{Liveness, SessionStore},
};
use std::{fmt, rc::Rc};
use yew::{hook, use_context, use_effect_with, use_memo};

#[derive(Clone)]
pub struct Portal {
    pub config: Rc<PortalConfig>,
    pub store: SessionStore,
    pub accounts: AccountService,
    pub directory: DirectoryService,
    pub calendar: CalendarService,
    pub activity: ActivityFeed,
    pub admin: AdminService,
}

impl Portal {
    /// Wire the REST adapters and local storage into the session store.
    pub fn connect(config: PortalConfig) -> Self {
        let config = Rc::new(config);
        let storage: Rc<dyn KeyValueStore> = Rc::new(BrowserStorage);
        let identity = RestIdentityProvider::new(Rc::clone(&config), Rc::clone(&storage));
        let documents: Rc<dyn DocumentStore> =
            Rc::new(RestDocumentStore::new(&config, identity.clone()));
        let store = SessionStore::new(Rc::new(identity), Rc::clone(&documents), storage);

        Self {
            accounts: AccountService::new(store.clone()),
            admin: AdminService::new(store.clone()),
            directory: DirectoryService::new(Rc::clone(&documents)),
            calendar: CalendarService::new(Rc::clone(&documents)),
            activity: ActivityFeed::new(documents),
            store,
            config,
        }
    }
}

/// One portal per application; identity is enough to compare.
impl PartialEq for Portal {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.config, &other.config)
    }
}

impl fmt::Debug for Portal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Portal")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// The portal provided by the application root.
///
/// # Panics
/// When rendered outside the `ContextProvider<Portal>` set up in `main`.
#[hook]
pub fn use_portal() -> Portal {
    use_context::<Portal>().expect("Portal context is provided by the application root")
}

/// A [`Liveness`] that ends when the calling component unmounts.
#[hook]
pub fn use_liveness() -> Liveness {
    let liveness = use_memo((), |()| Liveness::new());
    {
        let liveness = (*liveness).clone();
        use_effect_with((), move |()| move || liveness.end());
    }
    (*liveness).clone()
}
