pub mod actions;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sv_parser::VerilogParser;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result as LspResult;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Directories searched for project Verilog files (*.v, *.sv) that feed
    /// the cross-file module index
    #[serde(default)]
    pub source_directories: Vec<String>,

    /// Override config file location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file_path: Option<String>,
}

pub struct Backend {
    pub client: Client,
    pub documents: Arc<RwLock<HashMap<Url, String>>>,
    pub config: Arc<RwLock<ServerConfig>>,
    pub workspace_root: Arc<RwLock<Option<PathBuf>>>,
}

pub fn create_backend(client: Client) -> Backend {
    Backend {
        client,
        documents: Arc::new(RwLock::new(HashMap::new())),
        config: Arc::new(RwLock::new(ServerConfig::default())),
        workspace_root: Arc::new(RwLock::new(None)),
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> LspResult<InitializeResult> {
        *self.workspace_root.write().await =
            params.root_uri.and_then(|uri| uri.to_file_path().ok());

        let from_client = match params.initialization_options {
            Some(options) => match serde_json::from_value::<ServerConfig>(options) {
                Ok(config) => {
                    self.client
                        .log_message(MessageType::INFO, "Using configuration sent by the client")
                        .await;
                    Some(config)
                }
                Err(err) => {
                    self.client
                        .log_message(
                            MessageType::WARNING,
                            format!("Ignoring malformed initialization options: {}", err),
                        )
                        .await;
                    None
                }
            },
            None => None,
        };

        // Client settings win. A client config without source directories may
        // still name a custom config file, so it seeds the file lookup
        let config = match &from_client {
            Some(config) if !config.source_directories.is_empty() => config.clone(),
            seed => match self.read_workspace_config(seed.as_ref()).await {
                Some(file_config) => file_config,
                None => seed.clone().unwrap_or_default(),
            },
        };
        *self.config.write().await = config;

        Ok(InitializeResult {
            server_info: Some(ServerInfo {
                name: "sv-language-server".to_string(),
                version: Some("0.1.0".to_string()),
            }),
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                ..ServerCapabilities::default()
            },
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Verilog AUTO expansion server ready")
            .await;
    }

    async fn shutdown(&self) -> LspResult<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.on_change(
            params.text_document.uri,
            params.text_document.text,
            Some(params.text_document.version),
        )
        .await
    }

    async fn did_change(&self, mut params: DidChangeTextDocumentParams) {
        let new_text = std::mem::take(&mut params.content_changes[0].text);
        self.on_change(
            params.text_document.uri,
            new_text,
            Some(params.text_document.version),
        )
        .await
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        {
            let mut docs = self.documents.write().await;
            docs.remove(&params.text_document.uri);
        }
        self.client
            .publish_diagnostics(params.text_document.uri, Vec::new(), None)
            .await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        if let Ok(config) = serde_json::from_value::<ServerConfig>(params.settings) {
            let mut stored_config = self.config.write().await;
            *stored_config = config;
            self.client
                .log_message(MessageType::INFO, "Configuration updated")
                .await;
        } else {
            self.client
                .log_message(MessageType::WARNING, "Failed to parse new configuration")
                .await;
        }
    }

    async fn code_action(
        &self,
        params: CodeActionParams,
    ) -> LspResult<Option<CodeActionResponse>> {
        let uri = params.text_document.uri;

        let text = {
            let docs = self.documents.read().await;
            docs.get(&uri).cloned()
        };
        let Some(text) = text else {
            return Ok(None);
        };

        let project_files = self.project_files(&uri).await;
        let actions = actions::expand_actions(&uri, &text, params.range, &project_files);
        if actions.is_empty() {
            Ok(None)
        } else {
            Ok(Some(
                actions
                    .into_iter()
                    .map(CodeActionOrCommand::CodeAction)
                    .collect(),
            ))
        }
    }
}

impl Backend {
    async fn on_change(&self, uri: Url, text: String, version: Option<i32>) {
        let diagnostics = parse_diagnostics(&text);

        {
            let mut docs = self.documents.write().await;
            docs.insert(uri.clone(), text);
        }

        self.client
            .publish_diagnostics(uri, diagnostics, version)
            .await;
    }

    /// Project files consulted for module definitions: every other open
    /// document plus the Verilog files under the configured source
    /// directories, in a stable order.
    async fn project_files(&self, current: &Url) -> Vec<(String, String)> {
        let mut files = Vec::new();

        {
            let docs = self.documents.read().await;
            let mut open: Vec<(&Url, &String)> =
                docs.iter().filter(|(uri, _)| *uri != current).collect();
            open.sort_by_key(|(uri, _)| uri.as_str().to_string());
            for (uri, text) in open {
                files.push((uri.to_string(), text.clone()));
            }
        }

        let config = self.config.read().await;
        let workspace_root = self.workspace_root.read().await;
        if let Some(root) = workspace_root.as_ref() {
            for source_dir in &config.source_directories {
                let dir = if Path::new(source_dir).is_absolute() {
                    PathBuf::from(source_dir)
                } else {
                    root.join(source_dir)
                };
                let Ok(entries) = std::fs::read_dir(&dir) else {
                    continue;
                };
                let mut paths: Vec<PathBuf> = entries
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|path| {
                        matches!(
                            path.extension().and_then(|ext| ext.to_str()),
                            Some("v") | Some("sv")
                        )
                    })
                    .collect();
                paths.sort();
                for path in paths {
                    if let Ok(text) = std::fs::read_to_string(&path) {
                        files.push((path.display().to_string(), text));
                    }
                }
            }
        }

        files
    }

    /// Reads `.sv-autoexpand.toml` (or the override named in `seed`) from
    /// the workspace root. A missing file is normal; a file that does not
    /// parse as TOML is reported and discarded.
    async fn read_workspace_config(&self, seed: Option<&ServerConfig>) -> Option<ServerConfig> {
        let root = self.workspace_root.read().await.clone()?;
        let file_name = seed
            .and_then(|config| config.config_file_path.clone())
            .unwrap_or_else(|| ".sv-autoexpand.toml".to_string());
        let path = root.join(file_name);

        let content = tokio::fs::read_to_string(&path).await.ok()?;
        match toml::from_str::<ServerConfig>(&content) {
            Ok(config) => {
                self.client
                    .log_message(
                        MessageType::INFO,
                        format!("Read workspace configuration at {}", path.display()),
                    )
                    .await;
                Some(config)
            }
            Err(err) => {
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!("Could not parse {}: {}", path.display(), err),
                    )
                    .await;
                None
            }
        }
    }
}

/// Parse errors rendered as diagnostics, one per error.
pub fn parse_diagnostics(text: &str) -> Vec<Diagnostic> {
    let parser = VerilogParser::new();
    let Err(parse_error) = parser.parse_content(text) else {
        return Vec::new();
    };

    parse_error
        .errors
        .iter()
        .map(|error| {
            let range = match &error.location {
                Some(location) => Range::new(
                    Position::new(location.line as u32, location.column as u32),
                    Position::new(location.line as u32, location.column as u32 + 1),
                ),
                None => Range::new(Position::new(0, 0), Position::new(0, 1)),
            };
            Diagnostic {
                range,
                severity: Some(DiagnosticSeverity::ERROR),
                source: Some("sv-parser".to_string()),
                message: error.message.clone(),
                ..Diagnostic::default()
            }
        })
        .collect()
}
