use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::api::{ApiClient, ApiError};
use crate::domain::{Role, User};

/// Durable session layout under the data dir: the user as JSON and the bearer
/// token as a raw string, mirroring the two storage keys the web client used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPaths {
    pub dir: PathBuf,
    pub user_json: PathBuf,
    pub token: PathBuf,
}

impl SessionPaths {
    pub fn new(data_dir: &Path) -> Self {
        let dir = data_dir.join("session");
        Self {
            user_json: dir.join("user.json"),
            token: dir.join("token"),
            dir,
        }
    }
}

/// Invariant: `user` is present iff `token` is present. `open` enforces it on
/// hydration; `login`/`logout` preserve it by construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

/// Result of a login/register attempt. These operations report failure through
/// this struct instead of an error: a rejected or unreachable backend is an
/// expected outcome, not an exceptional one.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub success: bool,
    pub role: Option<Role>,
    pub message: Option<String>,
}

impl AuthOutcome {
    fn failure(e: ApiError) -> Self {
        Self {
            success: false,
            role: None,
            message: Some(e.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct SessionStore {
    data_dir: PathBuf,
    session: Session,
}

impl SessionStore {
    /// Hydrates the session from the durable files. A missing or empty token
    /// forces the session to anonymous even if a user file is still around;
    /// the half-present pair is unusable and the next login overwrites it.
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let paths = SessionPaths::new(data_dir);

        let token = match fs::read_to_string(&paths.token) {
            Ok(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", paths.token.display()));
            }
        };

        let user = match fs::read(&paths.user_json) {
            Ok(bytes) => Some(
                serde_json::from_slice::<User>(&bytes)
                    .with_context(|| format!("parse {}", paths.user_json.display()))?,
            ),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", paths.user_json.display()));
            }
        };

        let session = match (user, token) {
            (Some(user), Some(token)) => Session {
                user: Some(user),
                token: Some(token),
            },
            _ => Session::default(),
        };

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn user(&self) -> Option<&User> {
        self.session.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.token.as_deref()
    }

    /// Authenticates against the backend and, on success, updates memory and
    /// the durable mirror together. If the mirror cannot be written the
    /// in-memory session is left untouched too, so the two never disagree.
    pub async fn login(&mut self, api: &ApiClient, email: &str, password: &str) -> AuthOutcome {
        let auth = match api.login(email, password).await {
            Ok(auth) => auth,
            Err(e) => return AuthOutcome::failure(e),
        };

        if let Err(e) = self.persist(&auth.user, &auth.token) {
            return AuthOutcome {
                success: false,
                role: None,
                message: Some(format!("filesystem_error: {e:#}")),
            };
        }

        let role = auth.user.role;
        self.session = Session {
            user: Some(auth.user),
            token: Some(auth.token),
        };
        AuthOutcome {
            success: true,
            role: Some(role),
            message: None,
        }
    }

    /// Creates an account. Does not sign in: the session is untouched and the
    /// caller is expected to log in afterwards.
    pub async fn register(
        &self,
        api: &ApiClient,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> AuthOutcome {
        match api.register(name, email, password, role).await {
            Ok(auth) => AuthOutcome {
                success: true,
                role: Some(auth.user.role),
                message: None,
            },
            Err(e) => AuthOutcome::failure(e),
        }
    }

    /// Clears memory and removes both durable files. Idempotent.
    pub fn logout(&mut self) -> anyhow::Result<()> {
        self.session = Session::default();
        let paths = SessionPaths::new(&self.data_dir);
        remove_if_exists(&paths.user_json)?;
        remove_if_exists(&paths.token)?;
        Ok(())
    }

    fn persist(&self, user: &User, token: &str) -> anyhow::Result<()> {
        let paths = SessionPaths::new(&self.data_dir);
        fs::create_dir_all(&paths.dir)
            .with_context(|| format!("create session dir: {}", paths.dir.display()))?;
        let bytes = serde_json::to_vec_pretty(user).context("serialize session user")?;
        write_atomic(&paths.user_json, &bytes)
            .with_context(|| format!("write {}", paths.user_json.display()))?;
        write_atomic(&paths.token, token.as_bytes())
            .with_context(|| format!("write {}", paths.token.display()))?;
        Ok(())
    }
}

fn remove_if_exists(path: &Path) -> anyhow::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    {
        let mut f = fs::File::create(&tmp_path)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    fs::rename(tmp_path, path)?;
    Ok(())
}
