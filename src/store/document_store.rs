//! Almacén de documentos JSON
//!
//! Persistencia por colección completa: un archivo JSON por tipo de entidad
//! (`reservations.json`, `trajets.json`) que se reescribe entero en cada
//! mutación. Toda secuencia load-modify-save pasa por `mutate`, que serializa
//! los accesos por colección con un mutex y reemplaza el archivo de forma
//! atómica (temporal + rename), de modo que dos creaciones concurrentes no
//! pueden perder escrituras ni repartir el mismo id.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::utils::errors::{AppError, AppResult};

/// Calcula el siguiente id surrogate: max existente + 1, o 1 si no hay ninguno.
/// Debe llamarse dentro de `mutate` para que el cálculo quede bajo el lock.
pub fn next_id<I>(ids: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    ids.into_iter().max().unwrap_or(0) + 1
}

/// Almacén genérico de colecciones JSON, una por tipo de entidad
pub struct DocumentStore {
    data_dir: PathBuf,
    // Un lock por colección; el HashMap en sí se protege con un mutex corto
    locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> AppResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| {
            AppError::Internal(format!(
                "Cannot create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;
        Ok(Self {
            data_dir,
            locks: std::sync::Mutex::new(HashMap::new()),
        })
    }

    fn file_path(&self, kind: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", kind))
    }

    fn collection_lock(&self, kind: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("collection lock map poisoned");
        locks
            .entry(kind.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Carga la colección completa. Archivo ausente o en blanco => colección vacía.
    pub async fn load_all<T: DeserializeOwned>(&self, kind: &str) -> AppResult<Vec<T>> {
        read_collection(&self.file_path(kind), kind).await
    }

    /// Reescribe la colección completa de forma atómica (temporal + rename)
    pub async fn save_all<T: Serialize>(&self, kind: &str, items: &[T]) -> AppResult<()> {
        write_collection(&self.file_path(kind), kind, items).await
    }

    /// Ejecuta una secuencia load-modify-save bajo el lock de la colección.
    /// Todas las mutaciones de los servicios pasan por aquí: es lo que evita
    /// que dos `create` concurrentes lean el mismo snapshot y dupliquen ids.
    pub async fn mutate<T, R, F>(&self, kind: &str, f: F) -> AppResult<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let lock = self.collection_lock(kind);
        let _guard = lock.lock().await;

        let path = self.file_path(kind);
        let mut items: Vec<T> = read_collection(&path, kind).await?;
        let result = f(&mut items);
        write_collection(&path, kind, &items).await?;
        Ok(result)
    }
}

async fn read_collection<T: DeserializeOwned>(path: &Path, kind: &str) -> AppResult<Vec<T>> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            if json.trim().is_empty() {
                return Ok(Vec::new());
            }
            serde_json::from_str(&json).map_err(|e| {
                log::error!("❌ Error loading collection '{}': {}", kind, e);
                AppError::Internal(format!("Corrupt collection '{}': {}", kind, e))
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => {
            log::error!("❌ Error reading collection '{}': {}", kind, e);
            Err(AppError::Internal(format!(
                "Cannot read collection '{}': {}",
                kind, e
            )))
        }
    }
}

async fn write_collection<T: Serialize>(path: &Path, kind: &str, items: &[T]) -> AppResult<()> {
    let json = serde_json::to_string_pretty(items)
        .map_err(|e| AppError::Internal(format!("Cannot serialize collection '{}': {}", kind, e)))?;

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| {
            log::error!("❌ Error writing collection '{}': {}", kind, e);
            AppError::Internal(format!("Cannot write collection '{}': {}", kind, e))
        })?;

    // rename es atómico dentro del mismo filesystem
    tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
        log::error!("❌ Error replacing collection '{}': {}", kind, e);
        AppError::Internal(format!("Cannot replace collection '{}': {}", kind, e))
    })
}
