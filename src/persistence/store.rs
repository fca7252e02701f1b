//! The flow store: one JSON document per saved flow.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use uuid::Uuid;

use crate::constants::FLOW_NAME_MAX_LEN;
use crate::types::Flow;

use super::settings::StoreConfig;

/// Disk-backed store of saved flows.
///
/// Each flow lives in its own `<flowId>.json` file so a write never touches
/// any other flow. Writes go through a temp file plus rename so a crash
/// mid-save leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct FlowStore {
    dir: PathBuf,
}

impl FlowStore {
    /// Opens a store rooted at the configured flows directory.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            dir: config.flows_dir(),
        }
    }

    fn flow_path(&self, flow_id: &str) -> anyhow::Result<PathBuf> {
        // Ids are uuids we assigned; anything else is rejected rather than
        // resolved as a path.
        if flow_id.is_empty()
            || !flow_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            bail!("invalid flow id '{flow_id}'");
        }
        Ok(self.dir.join(format!("{flow_id}.json")))
    }

    fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating flow directory {}", self.dir.display()))
    }

    fn write_flow(&self, path: &Path, flow: &Flow) -> anyhow::Result<()> {
        let data = serde_json::to_vec_pretty(flow)?;
        let tmp_path = path.with_extension("json.tmp");
        {
            let mut f = File::create(&tmp_path)?;
            f.write_all(&data)?;
            f.flush()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// All saved flows, sorted by name. Unparsable documents are skipped
    /// with a warning rather than failing the whole listing.
    pub fn list(&self) -> anyhow::Result<Vec<Flow>> {
        let mut flows = Vec::new();
        if !self.dir.exists() {
            return Ok(flows);
        }
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|s| serde_json::from_str::<Flow>(&s).map_err(Into::into))
            {
                Ok(flow) => flows.push(flow),
                Err(err) => {
                    log::warn!("skipping unreadable flow {}: {err}", path.display());
                }
            }
        }
        flows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(flows)
    }

    /// Loads one flow by id, or `None` if it has never been saved.
    pub fn load(&self, flow_id: &str) -> anyhow::Result<Option<Flow>> {
        let path = self.flow_path(flow_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let s = fs::read_to_string(&path)?;
        let flow = serde_json::from_str(&s)?;
        Ok(Some(flow))
    }

    /// Saves a brand-new flow, assigning it an id. Returns the stored
    /// document including the new id.
    pub fn create(&self, mut flow: Flow) -> anyhow::Result<Flow> {
        self.ensure_dir()?;
        let id = Uuid::new_v4().to_string();
        flow.flow_id = Some(id.clone());
        flow.name = truncate_name(&flow.name);
        let path = self.flow_path(&id)?;
        self.write_flow(&path, &flow)?;
        log::info!("created flow {id} ('{}')", flow.name);
        Ok(flow)
    }

    /// Overwrites an existing flow. Returns `None` if no flow with that id
    /// exists.
    pub fn update(&self, mut flow: Flow, flow_id: &str) -> anyhow::Result<Option<Flow>> {
        let path = self.flow_path(flow_id)?;
        if !path.exists() {
            return Ok(None);
        }
        flow.flow_id = Some(flow_id.to_string());
        flow.name = truncate_name(&flow.name);
        self.write_flow(&path, &flow)?;
        log::info!("updated flow {flow_id} ('{}')", flow.name);
        Ok(Some(flow))
    }

    /// Deletes a saved flow. Returns `true` if a flow with that id
    /// existed.
    pub fn delete(&self, flow_id: &str) -> anyhow::Result<bool> {
        let path = self.flow_path(flow_id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        log::info!("deleted flow {flow_id}");
        Ok(true)
    }
}

/// Flow names are capped at the backend's column width.
fn truncate_name(name: &str) -> String {
    name.chars().take(FLOW_NAME_MAX_LEN).collect()
}
