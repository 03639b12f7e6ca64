use std::convert::TryInto;
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::error::SecurityError;

const PASSWORD_SALT: &str = "password.salt";
const USER_AUTH_PUBLIC: &str = "user_auth.pem.pub";
const USER_AUTH_PRIVATE: &str = "user_auth.pem";

pub type Salt = [u8; 16];

#[derive(Clone)]
pub struct KeySet {
    pub public: Vec<u8>,
    pub private: Vec<u8>,
}

impl std::fmt::Debug for KeySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeySet")
    }
}

/// Password salt, hashing cost and JWT signing keys, managed as rocket state.
#[derive(Debug, Clone)]
pub struct Security {
    pub salt: Salt,
    pub password_cost: u32,
    pub jwt_keys: KeySet,
}

#[inline]
fn security_dir() -> PathBuf {
    PathBuf::from(env::var("SECURITY_DIR").unwrap_or("./security".to_string()))
}

impl Security {
    pub fn new(salt: Salt, password_cost: u32, jwt_keys: KeySet) -> Security {
        Security {
            salt,
            password_cost: password_cost.clamp(4, 31),
            jwt_keys,
        }
    }

    pub fn load(password_cost: u32) -> Result<Security, SecurityError> {
        let dir = security_dir();

        if cfg!(feature = "generate-security") {
            fs::create_dir_all(&dir)?;
        }

        tracing::info!("Loading password salt...");
        let salt = load_salt(&dir)?;

        tracing::info!("Loading JWT signing keys...");
        let pub_key = fs::read(dir.join(USER_AUTH_PUBLIC)).ok();
        let priv_key = fs::read(dir.join(USER_AUTH_PRIVATE)).ok();

        let jwt_keys = match (pub_key, priv_key) {
            (Some(public), Some(private)) if !public.is_empty() && !private.is_empty() => {
                tracing::info!("Loaded JWT keys.");
                KeySet { public, private }
            }
            #[cfg(feature = "generate-security")]
            _ => generate_keys(&dir)?,
            #[cfg(not(feature = "generate-security"))]
            _ => return Err(SecurityError::MissingKeys(dir)),
        };

        Ok(Security::new(salt, password_cost, jwt_keys))
    }
}

fn load_salt(dir: &Path) -> Result<Salt, SecurityError> {
    let path = dir.join(PASSWORD_SALT);
    let salt: Option<Salt> = fs::read(&path).ok().and_then(|s| s.try_into().ok());

    match salt {
        Some(salt) => {
            tracing::info!("Salt found and loaded.");
            Ok(salt)
        }
        None if cfg!(feature = "generate-security") => {
            tracing::info!(
                "Salt not found in '{}'. Generating a new password salt.",
                path.display()
            );
            let salt: Salt = rand::random();
            fs::write(&path, salt)?;
            Ok(salt)
        }
        None => Err(SecurityError::MissingSalt(path)),
    }
}

#[cfg(feature = "generate-security")]
fn generate_keys(dir: &Path) -> Result<KeySet, SecurityError> {
    use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
    use rsa::pkcs8::EncodePublicKey;

    tracing::info!("Unable to load private and/or public user auth key(s). Generating a new pair.");

    tracing::info!("Generating a private RSA key. This will take a few minutes...");
    let mut rng = rand::thread_rng();
    let rsa_sk = rsa::RsaPrivateKey::new(&mut rng, 4096)
        .map_err(|e| SecurityError::KeyGeneration(e.to_string()))?;

    tracing::info!("Creating PS256 private key...");
    let private = rsa_sk
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| SecurityError::KeyGeneration(e.to_string()))?
        .to_string()
        .into_bytes();
    fs::write(dir.join(USER_AUTH_PRIVATE), private.as_slice())?;

    tracing::info!("Creating PS256 public key...");
    let public = rsa_sk
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| SecurityError::KeyGeneration(e.to_string()))?
        .into_bytes();
    fs::write(dir.join(USER_AUTH_PUBLIC), public.as_slice())?;

    tracing::info!("Done generating JWT keys.");

    Ok(KeySet { public, private })
}
