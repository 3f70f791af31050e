//! Publishing workflow.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use mp_cache::{PublishRecord, RecordStore, needs_upload};
use mp_config::RenderConfig;
use mp_document::{DocType, Document, PostStatus, PostType, clear_value};
use mp_renderer::{Renderer, normalize_more, sanitize_html, unescape_html};
use mp_wordpress::{BlogApi, Post, PostContent, PostFilter, Term};
use regex::Regex;
use tracing::{debug, info};

use crate::categories::{CategoryOp, CategorySpec, find_by_name};
use crate::error::PublishError;
use crate::media::MediaProcessor;
use crate::result::{CategoryResult, PublishOutcome, PublishResult};

/// Number of posts returned by [`Publisher::list`].
pub const LIST_LIMIT: u32 = 20;

static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Options shared by all publishing commands.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Upload the document even when its checksum is unchanged.
    pub force: bool,
    /// Upload media even when their checksums are unchanged.
    pub force_media: bool,
    /// Leave media references untouched.
    pub no_media: bool,
    /// Directory media references are resolved against (default: the
    /// document's directory).
    pub media_dir: Option<PathBuf>,
    /// Show what would happen without remote calls or cache writes.
    pub dry_run: bool,
    /// Remote post id, overriding the side-car and front matter.
    pub post_id: Option<String>,
    pub title: Option<String>,
    pub status: Option<PostStatus>,
    pub post_type: Option<PostType>,
    pub doctype: Option<DocType>,
    /// Extra `asciidoctor` attributes.
    pub attributes: Vec<String>,
    /// Metadata parameters every document must define.
    pub mandatory: Vec<String>,
}

/// Which command is publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    /// Create or update depending on whether a post id is known.
    Post,
    /// Create only; fails when the document was posted before.
    Create,
    /// Update only; fails when no post id is known.
    Update,
}

/// A loaded document with its publish state.
struct Job {
    doc: Document,
    store: RecordStore,
    record: PublishRecord,
    /// Effective post id: `--post-id`, then the side-car, then front matter.
    id: Option<String>,
}

/// Publishes documents to a blog.
pub struct Publisher<'a> {
    blog: &'a dyn BlogApi,
    render: &'a RenderConfig,
    options: PublishOptions,
}

impl<'a> Publisher<'a> {
    #[must_use]
    pub fn new(blog: &'a dyn BlogApi, render: &'a RenderConfig, options: PublishOptions) -> Self {
        Self {
            blog,
            render,
            options,
        }
    }

    fn open(&self, path: &Path) -> Result<Job, PublishError> {
        let mut doc = Document::load(path)?;
        doc.check_mandatory(&self.options.mandatory)?;
        let store = RecordStore::for_document(&doc.path, self.options.dry_run);
        let record = store.load()?;

        doc.doctype = self.options.doctype.or(doc.doctype).or(record.doctype);
        let id = self
            .options
            .post_id
            .clone()
            .or_else(|| record.id.clone())
            .or_else(|| doc.id.clone());

        Ok(Job {
            doc,
            store,
            record,
            id,
        })
    }

    fn render_html(&self, doc: &Document) -> Result<String, PublishError> {
        let html = Renderer::new(self.render)
            .with_attributes(self.options.attributes.clone())
            .render(doc)?;
        Ok(html)
    }

    /// Effective remote post id of a document.
    pub fn post_id(&self, path: &Path) -> Result<String, PublishError> {
        self.open(path)?.id.ok_or(PublishError::MissingCache)
    }

    /// Publish a document: convert, upload media, create or update the post
    /// and save the side-car.
    pub fn publish(&self, path: &Path, mode: PublishMode) -> Result<PublishResult, PublishError> {
        let mut job = self.open(path)?;
        match (mode, &job.id) {
            (PublishMode::Create, Some(_)) => return Err(PublishError::AlreadyPosted),
            (PublishMode::Update, None) => return Err(PublishError::MissingCache),
            _ => {}
        }

        let html = self.render_html(&job.doc)?;
        let title = self
            .options
            .title
            .clone()
            .or_else(|| job.doc.title.clone())
            .or_else(|| title_from_html(&html))
            .or_else(|| job.record.title.clone())
            .ok_or(PublishError::MissingTitle)?;
        let status = self
            .options
            .status
            .or(job.doc.status)
            .or(job.record.status)
            .unwrap_or_default();
        let post_type = self
            .options
            .post_type
            .or(job.doc.post_type)
            .or(job.record.post_type)
            .unwrap_or_default();

        let (html, media_uploaded) = if self.options.no_media {
            (html, 0)
        } else {
            self.process_media(&mut job, &html)?
        };
        let content = normalize_more(&sanitize_html(&html));

        let mut result = PublishResult {
            outcome: PublishOutcome::Skipped,
            id: job.id.clone(),
            url: job.record.url.clone(),
            title: title.clone(),
            status,
            post_type,
            media_uploaded,
        };

        if !needs_upload(
            job.record.checksum.as_deref(),
            &job.doc.checksum,
            self.options.force,
        ) {
            info!("skipping unmodified: {}", job.doc.path.display());
            job.store.save(&job.record)?;
            return Ok(result);
        }

        let post = PostContent {
            title: Some(title.clone()),
            content: Some(content),
            status: Some(status.as_str().to_owned()),
            post_type: Some(post_type.as_str().to_owned()),
            slug: job.doc.slug.clone(),
            date: job.doc.date,
            categories: job.doc.categories.clone(),
            tags: job.doc.tags.clone(),
            category_ids: None,
        };
        let action = if job.id.is_some() { "updating" } else { "creating" };
        info!("{action} {status} {post_type} '{title}'");

        result.outcome = if job.id.is_some() {
            PublishOutcome::Updated
        } else {
            PublishOutcome::Created
        };

        if self.options.dry_run {
            info!("dry run: not contacting the blog");
            return Ok(result);
        }

        let id = match job.id.clone() {
            Some(id) => {
                if !self.blog.edit_post(&id, &post)? {
                    return Err(PublishError::Rejected {
                        action: "update",
                        id,
                    });
                }
                id
            }
            None => {
                let id = self.blog.new_post(&post)?;
                // Content checksum stays old so a failure below retries as an update.
                job.record.id = Some(id.clone());
                job.store.save(&job.record)?;
                id
            }
        };
        info!("id: {id}");

        let remote = self.blog.get_post(&id)?;
        debug!("url: {}", remote.link);
        let record = &mut job.record;
        record.id = Some(id.clone());
        if !remote.link.is_empty() {
            record.url = Some(remote.link);
        }
        record.title = Some(title);
        record.status = Some(status);
        record.post_type = Some(post_type);
        record.doctype = job.doc.doctype;
        record.created_at = remote.created_at.or(record.created_at);
        record.updated_at = Some(chrono::Utc::now().timestamp());
        record.categories = remote.categories;
        record.checksum = Some(job.doc.checksum.clone());
        job.store.save(&job.record)?;

        result.id = Some(id);
        result.url.clone_from(&job.record.url);
        Ok(result)
    }

    /// Upload media and checkpoint the side-car.
    ///
    /// The checkpoint keeps the old content checksum, so a failing content
    /// call is retried on the next run while uploaded media is not.
    fn process_media(&self, job: &mut Job, html: &str) -> Result<(String, usize), PublishError> {
        let media_dir = match &self.options.media_dir {
            Some(dir) if !dir.is_dir() => return Err(PublishError::MediaDir(dir.clone())),
            Some(dir) => dir.clone(),
            None => job.doc.dir().to_path_buf(),
        };
        let before = job.record.media.clone();

        let processed = MediaProcessor::new(self.blog, media_dir)
            .force(self.options.force_media)
            .dry_run(self.options.dry_run)
            .process(html, &mut job.record);

        match processed {
            Ok(media) => {
                if media.uploaded > 0 {
                    debug!("checkpointing {} media upload(s)", media.uploaded);
                    job.store.save(&job.record)?;
                }
                Ok((media.html, media.uploaded))
            }
            Err(e) => {
                if job.record.media != before {
                    job.store.save(&job.record)?;
                }
                Err(e)
            }
        }
    }

    /// Delete the remote post and the side-car. Returns the deleted id.
    pub fn delete(&self, path: &Path) -> Result<String, PublishError> {
        let job = self.open(path)?;
        let id = job.id.ok_or(PublishError::MissingCache)?;
        info!("deleting post {id}");
        if self.options.dry_run {
            info!("dry run: not deleting post {id}");
        } else if !self.blog.delete_post(&id)? {
            return Err(PublishError::Rejected {
                action: "delete",
                id,
            });
        }
        job.store.delete()?;
        if !self.options.dry_run && job.doc.id.as_deref() == Some(id.as_str()) {
            forget_document_id(&job.doc)?;
        }
        Ok(id)
    }

    /// Most recent posts (or pages) on the blog.
    pub fn list(&self, post_type: PostType) -> Result<Vec<Post>, PublishError> {
        let posts = self.blog.get_posts(&PostFilter {
            post_type: post_type.as_str().to_owned(),
            number: LIST_LIMIT,
        })?;
        Ok(posts)
    }

    /// Blog categories sorted by name, ignoring case.
    pub fn categories(&self) -> Result<Vec<Term>, PublishError> {
        let mut terms = self.blog.get_categories()?;
        terms.sort_by_key(|t| t.name.to_lowercase());
        Ok(terms)
    }

    /// Change the categories of a published document.
    ///
    /// Names match existing categories ignoring case. Missing categories are
    /// created for replace and add specs; removing an unknown category is an
    /// error.
    pub fn assign_categories(
        &self,
        path: &Path,
        spec: &CategorySpec,
    ) -> Result<CategoryResult, PublishError> {
        let mut job = self.open(path)?;
        let id = job.id.clone().ok_or(PublishError::MissingCache)?;

        let mut all = self.blog.get_categories()?;
        let mut assigned: Vec<Term> = self
            .blog
            .get_post(&id)?
            .categories
            .iter()
            .filter_map(|name| find_by_name(&all, name, |t: &Term| t.name.as_str()))
            .map(|i| all[i].clone())
            .collect();
        let mut created = Vec::new();

        match spec.op {
            CategoryOp::Remove => {
                for name in &spec.names {
                    let i = find_by_name(&all, name, |t: &Term| t.name.as_str())
                        .ok_or_else(|| PublishError::UnknownCategory(name.clone()))?;
                    let term_id = &all[i].id;
                    assigned.retain(|t| &t.id != term_id);
                }
            }
            CategoryOp::Add | CategoryOp::Replace => {
                if spec.op == CategoryOp::Replace {
                    assigned.clear();
                }
                for name in &spec.names {
                    let term = self.find_or_create(&mut all, name, &mut created)?;
                    if find_by_name(&assigned, name, |t: &Term| t.name.as_str()).is_none() {
                        assigned.push(term);
                    }
                }
            }
        }

        let names: Vec<String> = assigned.iter().map(|t| t.name.clone()).collect();
        info!("assigning categories: {}", names.join(","));
        if !self.options.dry_run {
            let content = PostContent {
                category_ids: Some(assigned.into_iter().map(|t| t.id).collect()),
                ..PostContent::default()
            };
            if !self.blog.edit_post(&id, &content)? {
                return Err(PublishError::Rejected {
                    action: "update",
                    id,
                });
            }
        }

        job.record.categories.clone_from(&names);
        job.store.save(&job.record)?;
        Ok(CategoryResult {
            id,
            categories: names,
            created,
        })
    }

    fn find_or_create(
        &self,
        all: &mut Vec<Term>,
        name: &str,
        created: &mut Vec<String>,
    ) -> Result<Term, PublishError> {
        if let Some(i) = find_by_name(all.as_slice(), name, |t: &Term| t.name.as_str()) {
            return Ok(all[i].clone());
        }
        info!("creating new category: {name}");
        let id = if self.options.dry_run {
            String::new()
        } else {
            self.blog.new_category(name)?
        };
        let term = Term {
            id,
            name: name.to_owned(),
        };
        all.push(term.clone());
        created.push(name.to_owned());
        Ok(term)
    }

    /// Create an empty remote draft and return its id (`None` on dry run).
    pub fn create_draft(&self) -> Result<Option<String>, PublishError> {
        if self.options.dry_run {
            info!("dry run: not creating draft");
            return Ok(None);
        }
        let id = self.blog.new_post(&PostContent {
            title: Some(String::new()),
            content: Some(String::new()),
            status: Some(PostStatus::Draft.as_str().to_owned()),
            ..PostContent::default()
        })?;
        info!("created draft {id}");
        Ok(Some(id))
    }
}

/// Front matter skeleton for a freshly created draft.
#[must_use]
pub fn draft_stub(id: &str) -> String {
    format!("---\nuuid: {id}\ntitle: \nstatus: draft\ncategories: \ntags: \nslug: \n---\n\n")
}

/// Text of the first `<h1>` heading, with markup and entities removed.
fn title_from_html(html: &str) -> Option<String> {
    let caps = H1_RE.captures(html)?;
    let title = unescape_html(&TAG_RE.replace_all(&caps[1], ""));
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_owned())
}

/// Blank the post id in the document's front matter, so a deleted post is
/// not picked up again.
fn forget_document_id(doc: &Document) -> Result<(), PublishError> {
    let io_err = |source| PublishError::Io {
        path: doc.path.clone(),
        source,
    };
    let raw = std::fs::read_to_string(&doc.path).map_err(io_err)?;
    let (bom, text) = match raw.strip_prefix('\u{feff}') {
        Some(rest) => ("\u{feff}", rest),
        None => ("", raw.as_str()),
    };
    let Some(text) = clear_value(text, "uuid").or_else(|| clear_value(text, "id")) else {
        return Ok(());
    };
    info!("clearing post id in {}", doc.path.display());
    std::fs::write(&doc.path, format!("{bom}{text}")).map_err(io_err)
}
