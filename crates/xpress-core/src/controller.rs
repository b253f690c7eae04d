// ── Controller abstraction ──
//
// Entry point for the CLI and TUI. Owns the HTTP clients, the store and the
// remote resources; handles sign-in with admin gating, data loading, and
// command execution with cache invalidation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use secrecy::SecretString;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use xpress_api::transport::{TlsMode, TransportConfig};
use xpress_api::{Client, IdentityClient, IdentitySession, claims};

use crate::command::{Command, CommandResult};
use crate::config::{AuthMode, ControllerConfig, TlsVerification};
use crate::convert::enrich_vendor_names;
use crate::error::CoreError;
use crate::model::{Product, Role, Session, SessionUser, User, Vendor};
use crate::resource::{Invalidation, Resource};
use crate::store::{Action, SESSION_LIFETIME_MS, SessionStore, Store, now_ms};

const INVALIDATION_CHANNEL_SIZE: usize = 32;

/// Role query used to list vendor accounts.
const VENDOR_ROLE: &str = "vendor";

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    client: Client,
    identity: Option<IdentityClient>,
    store: Store,
    /// Bumped by every catalog fetch; only the newest may write the store.
    products_generation: AtomicU64,
    /// Products for one category (the category browser).
    category_products: Resource<Product>,
    /// `GET /vendors`
    vendors: Resource<Vendor>,
    /// `GET /users?role=vendor`, used to name product vendors.
    vendor_users: Resource<User>,
    /// `GET /users`
    users: Resource<User>,
    invalidation_tx: broadcast::Sender<Invalidation>,
}

impl Controller {
    /// Build a controller and restore any saved session that is still
    /// valid. Makes no network calls.
    pub fn new(
        config: ControllerConfig,
        sessions: Arc<dyn SessionStore>,
    ) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = Client::new(config.api_url.as_str(), &transport)?;

        let identity = match &config.auth {
            AuthMode::Identity { api_key, url } => Some(IdentityClient::new(
                api_key.clone(),
                url.as_deref(),
                &transport,
            )?),
            AuthMode::Backend => None,
        };

        let store = Store::restore(sessions, now_ms());
        if let Some(token) = store.with_state(|s| s.auth.token.clone()) {
            client.set_token(token);
        }

        let (invalidation_tx, _) = broadcast::channel(INVALIDATION_CHANNEL_SIZE);

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                identity,
                store,
                products_generation: AtomicU64::new(0),
                category_products: Resource::new("category_products"),
                vendors: Resource::new("vendors"),
                vendor_users: Resource::new("vendor_users"),
                users: Resource::new("users"),
                invalidation_tx,
            }),
        })
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    // ── Authentication ───────────────────────────────────────────

    /// Sign in with email and password.
    ///
    /// Only admins get a session. Anyone else is rejected with
    /// [`CoreError::Forbidden`] and nothing is persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, CoreError> {
        self.inner.store.dispatch(Action::LoginPending);

        let result = match (&self.inner.config.auth, &self.inner.identity) {
            (AuthMode::Identity { .. }, Some(identity)) => identity
                .sign_in_with_password(email, password)
                .await
                .map_err(CoreError::from)
                .and_then(|s| identity_login(&s)),
            _ => self.backend_login(email, password).await,
        };

        self.finish_login(result, "Failed to log in")
    }

    /// Sign in with an OAuth provider (Google) ID token obtained out of
    /// band. Requires identity auth mode.
    pub async fn login_with_provider_token(&self, id_token: &str) -> Result<Session, CoreError> {
        let identity = self.identity()?;
        self.inner.store.dispatch(Action::LoginPending);

        let result = identity
            .sign_in_with_idp(id_token)
            .await
            .map_err(CoreError::from)
            .and_then(|s| identity_login(&s));

        self.finish_login(result, "Failed to log in with Google")
    }

    /// Ask the identity provider to email a password-reset link.
    pub async fn reset_password(&self, email: &str) -> Result<(), CoreError> {
        self.identity()?.send_password_reset(email).await?;
        info!(email, "password reset email requested");
        Ok(())
    }

    /// Drop the session from memory and durable storage.
    pub fn logout(&self) {
        self.inner.client.clear_token();
        self.inner.products_generation.fetch_add(1, Ordering::SeqCst);
        self.inner.store.dispatch(Action::Logout);
        info!("signed out");
    }

    /// The current session, if one exists and has not expired.
    pub fn session(&self) -> Option<Session> {
        self.inner
            .store
            .with_state(|s| s.auth.session_at(now_ms()))
    }

    /// The current session, provided it belongs to an admin.
    pub fn require_admin(&self) -> Result<Session, CoreError> {
        self.ensure_live_session()?;
        let Some(session) = self.session() else {
            return Err(CoreError::NotAuthenticated);
        };
        if !session.is_admin() {
            return Err(CoreError::Forbidden {
                role: session
                    .user
                    .map_or_else(|| claims::DEFAULT_ROLE.to_owned(), |u| u.role),
            });
        }
        Ok(session)
    }

    /// Refuse to read with a token whose session has lapsed.
    ///
    /// The stale token is dropped from the client and the store so it is
    /// never sent again. With no token at all, requests go out anonymously
    /// and the backend decides.
    fn ensure_live_session(&self) -> Result<(), CoreError> {
        let now = now_ms();
        let expired = self
            .inner
            .store
            .with_state(|s| s.auth.token.is_some() && !s.auth.is_authenticated_at(now));
        if expired {
            warn!("session expired; signing out");
            self.logout();
            return Err(CoreError::SessionExpired);
        }
        Ok(())
    }

    fn identity(&self) -> Result<&IdentityClient, CoreError> {
        self.inner.identity.as_ref().ok_or_else(|| CoreError::Config {
            message: "this operation needs the identity auth mode (auth = \"identity\")".into(),
        })
    }

    async fn backend_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(SecretString, SessionUser), CoreError> {
        let resp = self.inner.client.login(email, password).await?;
        let user = match resp.user {
            Some(record) => {
                let user = User::from(record);
                if user.role.is_some() {
                    SessionUser::from(user)
                } else {
                    SessionUser {
                        role: role_or_default(&resp.token),
                        ..SessionUser::from(user)
                    }
                }
            }
            None => {
                let claims = claims::decode_claims(&resp.token).unwrap_or_default();
                SessionUser {
                    uid: claims.user_id.unwrap_or_default(),
                    email: claims.email.or_else(|| Some(email.to_owned())),
                    role: role_or_default(&resp.token),
                }
            }
        };
        Ok((SecretString::from(resp.token), user))
    }

    fn finish_login(
        &self,
        result: Result<(SecretString, SessionUser), CoreError>,
        failure_prefix: &str,
    ) -> Result<Session, CoreError> {
        let (token, user) = match result {
            Ok(ok) => ok,
            Err(e) => {
                warn!(error = %e, "sign-in failed");
                self.inner
                    .store
                    .dispatch(Action::LoginRejected(format!("{failure_prefix}: {e}")));
                return Err(e);
            }
        };

        if !user.is_admin() {
            info!(role = %user.role, "sign-in refused: not an admin");
            let err = CoreError::Forbidden {
                role: user.role.clone(),
            };
            self.inner
                .store
                .dispatch(Action::LoginRejected(err.to_string()));
            return Err(err);
        }

        let expires_at_ms = now_ms() + SESSION_LIFETIME_MS;
        self.inner.client.set_token(token.clone());
        self.inner.store.dispatch(Action::LoginFulfilled {
            token: token.clone(),
            user: user.clone(),
            expires_at_ms,
        });
        info!(uid = %user.uid, "signed in");

        Ok(Session {
            token,
            user: Some(user),
            expires_at_ms,
        })
    }

    // ── Products ─────────────────────────────────────────────────

    /// Fetch the catalog into the store, resolving vendor names against
    /// the vendor accounts. A failed vendor lookup only costs the names.
    ///
    /// Returns `Ok(false)` when a newer fetch (or a logout) started while
    /// this one was in flight; its response is discarded and the store is
    /// left to the newer request. Read the rows with
    /// [`products`](Self::products).
    pub async fn fetch_products(&self) -> Result<bool, CoreError> {
        self.ensure_live_session()?;
        let store = &self.inner.store;
        let generation = self.inner.products_generation.fetch_add(1, Ordering::SeqCst) + 1;
        store.dispatch(Action::ProductsFetchPending);

        let (products, vendors) = tokio::join!(
            self.inner.client.list_products(),
            self.inner.client.list_users_by_role(VENDOR_ROLE),
        );

        if self.inner.products_generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "dropping superseded catalog response");
            return Ok(false);
        }

        let mut products: Vec<Product> = match products {
            Ok(records) => records.into_iter().map(Product::from).collect(),
            Err(e) => {
                let err = CoreError::from(e);
                store.dispatch(Action::ProductsFetchRejected(err.to_string()));
                return Err(err);
            }
        };

        match vendors {
            Ok(records) => {
                let vendors: Vec<User> = records.into_iter().map(User::from).collect();
                enrich_vendor_names(&mut products, &vendors);
            }
            Err(e) => warn!(error = %e, "vendor lookup failed; vendor names may be missing"),
        }

        debug!(count = products.len(), "products fetched");
        store.dispatch(Action::ProductsFetchFulfilled(products));
        Ok(true)
    }

    /// One product by id.
    pub async fn product(&self, id: &str) -> Result<Product, CoreError> {
        self.ensure_live_session()?;
        self.inner
            .client
            .get_product(id)
            .await?
            .map(Product::from)
            .ok_or_else(|| CoreError::not_found("Product", id))
    }

    /// Cached products from the last [`fetch_products`](Self::fetch_products).
    pub fn products(&self) -> Vec<Product> {
        self.inner.store.with_state(|s| s.products.items.clone())
    }

    /// Load one category's products into
    /// [`category_products`](Self::category_products). `None` clears the
    /// resource without fetching.
    pub async fn load_products_by_category(&self, slug: Option<&str>) -> Result<bool, CoreError> {
        let Some(slug) = slug.filter(|s| !s.is_empty()) else {
            self.inner.category_products.skip();
            return Ok(false);
        };
        self.ensure_live_session()?;
        let client = &self.inner.client;
        self.inner
            .category_products
            .load(async {
                let records = client.list_products_by_category(slug).await?;
                Ok(records.into_iter().map(Product::from).collect())
            })
            .await
    }

    pub fn category_products(&self) -> &Resource<Product> {
        &self.inner.category_products
    }

    // ── Vendors and users ────────────────────────────────────────

    /// `GET /vendors` into [`vendors`](Self::vendors).
    pub async fn load_vendors(&self) -> Result<bool, CoreError> {
        self.ensure_live_session()?;
        let client = &self.inner.client;
        self.inner
            .vendors
            .load(async {
                let records = client.list_vendors().await?;
                Ok(records.into_iter().map(Vendor::from).collect())
            })
            .await
    }

    pub fn vendors(&self) -> &Resource<Vendor> {
        &self.inner.vendors
    }

    /// Vendor accounts (`GET /users?role=vendor`) into
    /// [`vendor_users`](Self::vendor_users).
    pub async fn load_vendor_directory(&self) -> Result<bool, CoreError> {
        self.ensure_live_session()?;
        let client = &self.inner.client;
        self.inner
            .vendor_users
            .load(async {
                let records = client.list_users_by_role(VENDOR_ROLE).await?;
                Ok(records.into_iter().map(User::from).collect())
            })
            .await
    }

    pub fn vendor_users(&self) -> &Resource<User> {
        &self.inner.vendor_users
    }

    /// `GET /users` into [`users`](Self::users).
    pub async fn load_users(&self) -> Result<bool, CoreError> {
        self.ensure_live_session()?;
        let client = &self.inner.client;
        self.inner
            .users
            .load(async {
                let records = client.list_users().await?;
                Ok(records.into_iter().map(User::from).collect())
            })
            .await
    }

    pub fn users(&self) -> &Resource<User> {
        &self.inner.users
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a write. Requires an admin session.
    ///
    /// On success the matching [`Invalidation`] is broadcast so open list
    /// views re-fetch.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        self.require_admin()?;
        let client = &self.inner.client;
        let store = &self.inner.store;

        let (result, stale) = match cmd {
            Command::AddProduct(upload) => {
                store.dispatch(Action::ProductAddPending);
                match client.create_product(upload).await {
                    Ok(created) => {
                        let created = created.map(Product::from);
                        store.dispatch(Action::ProductAddFulfilled(created.clone()));
                        (CommandResult::Product(created), Invalidation::Products)
                    }
                    Err(e) => return Err(reject(store, Action::ProductAddRejected, e)),
                }
            }
            Command::UpdateProduct { id, upload } => {
                store.dispatch(Action::ProductUpdatePending);
                match client.update_product(&id, upload).await {
                    Ok(updated) => {
                        let updated = updated.map(Product::from);
                        store.dispatch(Action::ProductUpdateFulfilled(updated.clone()));
                        (CommandResult::Product(updated), Invalidation::Products)
                    }
                    Err(e) => return Err(reject(store, Action::ProductUpdateRejected, e)),
                }
            }
            Command::DeleteProduct { id, hard } => {
                store.dispatch(Action::ProductDeletePending);
                match client.delete_product(&id, hard).await {
                    Ok(_) => {
                        info!(%id, hard, "product deleted");
                        store.dispatch(Action::ProductDeleteFulfilled { id });
                        (CommandResult::Ok, Invalidation::Products)
                    }
                    Err(e) => return Err(reject(store, Action::ProductDeleteRejected, e)),
                }
            }
            Command::CreateVendor(payload) => {
                let created = client.create_vendor(&payload).await?;
                info!(name = %payload.name, "vendor created");
                (
                    CommandResult::Vendor(created.map(Vendor::from)),
                    Invalidation::Vendors,
                )
            }
            Command::UpdateVendor { id, payload } => {
                let updated = client.update_vendor(&id, &payload).await?;
                info!(%id, "vendor updated");
                (
                    CommandResult::Vendor(updated.map(Vendor::from)),
                    Invalidation::Vendors,
                )
            }
            Command::DeleteVendor { id } => {
                client.delete_vendor(&id).await?;
                info!(%id, "vendor deleted");
                (CommandResult::Ok, Invalidation::Vendors)
            }
            Command::AssignRole { uid, role } => {
                assign_role(client, &uid, role).await?;
                (CommandResult::Ok, Invalidation::Users)
            }
        };

        // No receivers is fine: nothing is listening for refreshes.
        let _ = self.inner.invalidation_tx.send(stale);
        Ok(result)
    }

    /// Subscribe to cache invalidations.
    pub fn invalidations(&self) -> broadcast::Receiver<Invalidation> {
        self.inner.invalidation_tx.subscribe()
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn identity_login(session: &IdentitySession) -> Result<(SecretString, SessionUser), CoreError> {
    let claims = claims::decode_claims(&session.id_token)?;
    let role = claims
        .role
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| claims::DEFAULT_ROLE.to_owned());
    Ok((
        SecretString::from(session.id_token.clone()),
        SessionUser {
            uid: session.local_id.clone(),
            email: session.email.clone().or(claims.email),
            role,
        },
    ))
}

/// The token's `role` claim; opaque tokens count as the default role.
fn role_or_default(token: &str) -> String {
    claims::role_from_token(token).unwrap_or_else(|e| {
        debug!(error = %e, "token carries no readable claims");
        claims::DEFAULT_ROLE.to_owned()
    })
}

async fn assign_role(client: &Client, uid: &str, role: Role) -> Result<(), CoreError> {
    client.assign_role(uid, &role.to_string()).await?;
    info!(uid, %role, "role assigned");
    Ok(())
}

fn reject(
    store: &Store,
    action: impl FnOnce(String) -> Action,
    err: xpress_api::Error,
) -> CoreError {
    let err = CoreError::from(err);
    store.dispatch(action(err.to_string()));
    err
}

/// Build a [`TransportConfig`] from the controller configuration.
fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("api_url", &self.inner.config.api_url.as_str())
            .field("signed_in", &self.session().is_some())
            .finish_non_exhaustive()
    }
}
