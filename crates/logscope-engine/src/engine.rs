//! The request engine: tree, content and search handlers.

use std::collections::HashSet;
use std::sync::Arc;

use logscope_parse::ParserRegistry;
use logscope_source::{Source, Sources, WalkEntry};
use regex::Regex;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cache::TreeCache;
use crate::combiner::TreeCombiner;
use crate::config::EngineConfig;
use crate::protocol::{filter_files, Action, File, FileInstance, Meta, Path, Request, Response};
use crate::reader::scan_source_file;

/// The concurrent fan-out request engine.
///
/// One engine serves every connection. Each request handler fans out one
/// blocking task per enabled source; per-source failures are logged and
/// never abort the other sources.
pub struct Engine {
    config: EngineConfig,
    sources: Sources,
    parser: Arc<ParserRegistry>,
    cache: TreeCache,
    exclude_dirs: HashSet<String>,
    exclude_extensions: HashSet<String>,
}

impl Engine {
    /// Creates an engine over a frozen source registry.
    #[must_use]
    pub fn new(config: EngineConfig, sources: Sources, parser: ParserRegistry) -> Self {
        let cache = TreeCache::new(config.cache_expiration);
        let exclude_dirs = config.exclude_dirs.iter().cloned().collect();
        let exclude_extensions = config.exclude_extensions.iter().cloned().collect();
        Self {
            config,
            sources,
            parser: Arc::new(parser),
            cache,
            exclude_dirs,
            exclude_extensions,
        }
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The source registry.
    #[must_use]
    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    pub(crate) fn parser(&self) -> &ParserRegistry {
        &self.parser
    }

    /// Serves one request to completion, then emits the terminal marker.
    ///
    /// The marker is emitted on every path, cancellation included; a
    /// request id is settled once its marker has been sent.
    pub async fn serve(
        self: Arc<Self>,
        request: Request,
        token: CancellationToken,
        outbound: mpsc::Sender<Response>,
    ) {
        let reply = Meta::reply(request.meta.id, request.meta.action);
        match request.meta.action {
            Action::GetFileTree => self.clone().serve_tree(&request, &token, &outbound).await,
            Action::GetContent => self.clone().serve_content(&request, &token, &outbound).await,
            Action::Search => self.clone().serve_search(&request, &token, &outbound).await,
            Action::Unknown => {}
        }
        if token.is_cancelled() {
            debug!(id = request.meta.id, "request cancelled");
        }
        let _ = outbound.send(Response::finished(reply)).await;
    }

    async fn serve_tree(
        self: Arc<Self>,
        request: &Request,
        token: &CancellationToken,
        outbound: &mpsc::Sender<Response>,
    ) {
        let cache_key = request.base().key();
        let files = match self.cache.get(&cache_key) {
            Some(files) => files,
            None => {
                let combiner = Arc::new(TreeCombiner::new());
                let mut walks = JoinSet::new();
                for source in self.sources.iter() {
                    let engine = self.clone();
                    let source = source.clone();
                    let base = request.base().clone();
                    let token = token.clone();
                    let combiner = combiner.clone();
                    walks.spawn_blocking(move || {
                        if token.is_cancelled() {
                            return;
                        }
                        engine.walk_tree_source(&token, &source, &base, &combiner);
                    });
                }
                while walks.join_next().await.is_some() {}

                debug!(base = %cache_key, files = combiner.len(), "merged tree");
                let files = Arc::new(combiner.take_files());
                self.cache.insert(cache_key, files.clone());
                files
            }
        };

        let files = filter_files(&files, &request.filter_set());
        let _ = outbound
            .send(Response::tree(
                Meta::reply(request.meta.id, request.meta.action),
                files,
            ))
            .await;
    }

    fn walk_tree_source(
        &self,
        token: &CancellationToken,
        source: &Source,
        base: &Path,
        combiner: &TreeCombiner,
    ) {
        self.recurse(token, source, base, |entry| {
            if entry.path.is_empty() {
                return;
            }
            combiner.add(
                File {
                    key: entry.path.clone(),
                    path: Path::from_key(&entry.path),
                    is_dir: entry.stat.is_dir,
                    instances: Vec::new(),
                },
                FileInstance {
                    size: entry.stat.size,
                    fs: source.name.clone(),
                },
            );
        });
    }

    async fn serve_content(
        self: Arc<Self>,
        request: &Request,
        token: &CancellationToken,
        outbound: &mpsc::Sender<Response>,
    ) {
        let sources = self.sources.filtered(&request.filter_set());
        let mut scans = JoinSet::new();
        for source in sources {
            let engine = self.clone();
            let request = request.clone();
            let token = token.clone();
            let outbound = outbound.clone();
            scans.spawn_blocking(move || {
                if token.is_cancelled() {
                    return;
                }
                let path = request.base().clone();
                scan_source_file(&engine, &token, &outbound, &request, &source, &path, None);
            });
        }
        while scans.join_next().await.is_some() {}
    }

    async fn serve_search(
        self: Arc<Self>,
        request: &Request,
        token: &CancellationToken,
        outbound: &mpsc::Sender<Response>,
    ) {
        let regex = match Regex::new(&request.regexp) {
            Ok(regex) => Arc::new(regex),
            Err(e) => {
                let _ = outbound
                    .send(Response::error(
                        Meta::reply(request.meta.id, request.meta.action),
                        format!("bad regexp {:?}: {e}", request.regexp),
                    ))
                    .await;
                return;
            }
        };

        let sources = self.sources.filtered(&request.filter_set());
        let mut searches = JoinSet::new();
        for source in sources {
            let engine = self.clone();
            let request = request.clone();
            let token = token.clone();
            let outbound = outbound.clone();
            let regex = regex.clone();
            searches.spawn_blocking(move || {
                if token.is_cancelled() {
                    return;
                }
                engine.search_source(&token, &outbound, &request, &source, &regex);
            });
        }
        while searches.join_next().await.is_some() {}
    }

    fn search_source(
        &self,
        token: &CancellationToken,
        outbound: &mpsc::Sender<Response>,
        request: &Request,
        source: &Source,
        regex: &Regex,
    ) {
        self.recurse(token, source, request.base(), |entry| {
            let path = Path::from_key(&entry.path);
            scan_source_file(self, token, outbound, request, source, &path, Some(regex));
        });
    }

    /// Walks one source applying the exclusion policy, invoking `visit`
    /// for each surviving entry. Walker errors are logged and skipped.
    fn recurse(
        &self,
        token: &CancellationToken,
        source: &Source,
        base: &Path,
        mut visit: impl FnMut(&WalkEntry),
    ) {
        let base_key = source.fs.join(base.segments());
        let mut walker = source.fs.walk(&base_key);
        while let Some(step) = walker.step() {
            if token.is_cancelled() {
                return;
            }
            let entry = match step {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(source = %source.name, base = %base_key, error = %e, "walk failed");
                    continue;
                }
            };
            if entry.stat.is_dir {
                if self.exclude_dirs.contains(basename(&entry.path)) {
                    walker.skip_dir();
                    continue;
                }
            } else if self.exclude_extensions.contains(extension(&entry.path)) {
                continue;
            }
            visit(&entry);
        }
    }
}

/// The final path element.
fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// The extension of the final path element, including the leading dot.
/// Empty when there is none.
fn extension(path: &str) -> &str {
    let name = basename(path);
    match name.rfind('.') {
        Some(pos) if pos > 0 => &name[pos..],
        _ => "",
    }
}
