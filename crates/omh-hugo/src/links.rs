//! Internal link rewriting.
//!
//! Supports the link forms Obsidian writes:
//! - Wikilinks: `[[note]]`, `[[note|text]]`, `[[note#heading]]`, `[[#heading]]`
//! - Embeds: `![[image.png]]`, `![[image.png|300]]`
//! - Relative markdown links and images: `[text](Other%20Note.md)`, `![alt](img/a.png)`
//!
//! Resolved note links point at `/<sub-path>/<slug>/`, asset links at
//! `/<sub-path>/<asset path>`. Anything that does not resolve is left exactly
//! as written. Links inside code blocks and inline code are never touched.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use omh_core::slug::anchorize;
use omh_vault::{slash_path, ObsidianDirectory};
use regex::{Captures, Regex};
use tracing::{debug, warn};

static LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<wiki_embed>!?)\[\[(?P<wiki>[^\[\]\n]+)\]\]|(?P<md_embed>!?)\[(?P<text>[^\[\]\n]*)\]\((?P<target><[^<>\n]+>|[^()\s]+)\)",
    )
    .expect("link regex")
});

static CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^```[\s\S]*?^```|^~~~[\s\S]*?^~~~|`[^`\n]+`").expect("code regex")
});

/// What a reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    Note { source: PathBuf, slug: String },
    Asset { source: PathBuf, destination: PathBuf },
}

/// Result of rewriting one note body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewritten {
    pub body: String,
    /// Number of links that were rewritten.
    pub resolved: usize,
    /// Links left untouched, exactly as they appear in the body.
    pub unresolved: Vec<String>,
}

enum Outcome {
    Rewritten(String),
    Unresolved,
    Ignored,
}

/// Resolves references against every retained note and asset of a vault.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    sub_path: String,
    /// Keys exactly as they appear in the vault.
    exact: HashMap<String, LinkTarget>,
    /// Lower-cased keys.
    targets: HashMap<String, LinkTarget>,
    excluded: HashSet<String>,
}

impl LinkRewriter {
    /// Build the lookup table for `directory`.
    ///
    /// Keys are the vault-relative path with and without the markdown
    /// extension, the file name and, for notes, the file stem. An exact-case
    /// match wins over a case-insensitive one and full paths win over short
    /// names. Among equal keys the first entry in path order wins.
    #[must_use]
    pub fn new(directory: &ObsidianDirectory, sub_path: &str) -> Self {
        let mut exact = HashMap::new();
        let mut targets = HashMap::new();

        let notes = directory.notes.iter().map(|note| {
            let target = LinkTarget::Note {
                source: note.path.clone(),
                slug: note.slug.clone(),
            };
            (&note.path, true, target)
        });
        let assets = directory.assets.iter().map(|asset| {
            let target = LinkTarget::Asset {
                source: asset.path.clone(),
                destination: asset.destination(),
            };
            (&asset.path, false, target)
        });
        let mut entries: Vec<_> = notes.chain(assets).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let full = entries.iter().flat_map(|(path, is_note, target)| {
            full_keys(path, *is_note).into_iter().map(move |key| (key, target))
        });
        let short = entries.iter().flat_map(|(path, is_note, target)| {
            short_keys(path, *is_note).into_iter().map(move |key| (key, target))
        });
        for (key, target) in full.chain(short) {
            targets
                .entry(key.to_lowercase())
                .or_insert_with(|| target.clone());
            exact.entry(key).or_insert_with(|| target.clone());
        }

        let excluded = directory
            .excluded
            .iter()
            .flat_map(|path| full_keys(path, true).into_iter().chain(short_keys(path, true)))
            .map(|key| key.to_lowercase())
            .collect();

        Self {
            sub_path: sub_path.trim_matches('/').to_string(),
            exact,
            targets,
            excluded,
        }
    }

    /// Resolve `reference` as written in the note at `from`.
    ///
    /// Paths relative to the note's directory are tried before
    /// vault-relative paths and bare names.
    #[must_use]
    pub fn resolve(&self, reference: &str, from: &Path) -> Option<&LinkTarget> {
        let candidates = self.candidates(reference, from);
        candidates
            .iter()
            .find_map(|key| self.exact.get(key))
            .or_else(|| {
                candidates
                    .iter()
                    .find_map(|key| self.targets.get(&key.to_lowercase()))
            })
    }

    /// Public URL of a resolved target, with an optional fragment.
    #[must_use]
    pub fn url_for(&self, target: &LinkTarget, fragment: Option<&str>) -> String {
        let mut url = String::from("/");
        if !self.sub_path.is_empty() {
            url.push_str(&encode_path(&self.sub_path));
            url.push('/');
        }
        match target {
            LinkTarget::Note { slug, .. } => {
                url.push_str(&encode_path(slug));
                url.push('/');
                if let Some(heading) = fragment.map(anchorize).filter(|h| !h.is_empty()) {
                    url.push('#');
                    url.push_str(&heading);
                }
            }
            LinkTarget::Asset { destination, .. } => {
                url.push_str(&encode_path(&slash_path(destination)));
                if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
                    url.push('#');
                    url.push_str(fragment);
                }
            }
        }
        url
    }

    /// Rewrite every internal link in `body` of the note at `note_path`.
    #[must_use]
    pub fn rewrite(&self, body: &str, note_path: &Path) -> Rewritten {
        let code: Vec<Range<usize>> = CODE_REGEX.find_iter(body).map(|m| m.range()).collect();

        let mut output = String::with_capacity(body.len());
        let mut resolved = 0;
        let mut unresolved = Vec::new();
        let mut last = 0;

        for caps in LINK_REGEX.captures_iter(body) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if code.iter().any(|range| range.contains(&whole.start())) {
                continue;
            }

            output.push_str(&body[last..whole.start()]);
            match self.rewrite_link(&caps, note_path) {
                Outcome::Rewritten(link) => {
                    resolved += 1;
                    output.push_str(&link);
                }
                Outcome::Unresolved => {
                    self.report_unresolved(whole.as_str(), note_path);
                    unresolved.push(whole.as_str().to_string());
                    output.push_str(whole.as_str());
                }
                Outcome::Ignored => output.push_str(whole.as_str()),
            }
            last = whole.end();
        }
        output.push_str(&body[last..]);

        Rewritten {
            body: output,
            resolved,
            unresolved,
        }
    }

    fn rewrite_link(&self, caps: &Captures<'_>, note_path: &Path) -> Outcome {
        if let Some(inner) = caps.name("wiki") {
            let embed = caps.name("wiki_embed").is_some_and(|m| !m.is_empty());
            return self.rewrite_wikilink(inner.as_str(), embed, note_path);
        }

        let (Some(text), Some(target)) = (caps.name("text"), caps.name("target")) else {
            return Outcome::Ignored;
        };
        let embed = caps.name("md_embed").is_some_and(|m| !m.is_empty());
        self.rewrite_markdown_link(text.as_str(), target.as_str(), embed, note_path)
    }

    fn rewrite_wikilink(&self, inner: &str, embed: bool, note_path: &Path) -> Outcome {
        let (reference, alias) = match inner.split_once('|') {
            Some((reference, alias)) => (reference.trim_end_matches('\\'), Some(alias.trim())),
            None => (inner, None),
        };
        let (name, heading) = match reference.split_once('#') {
            Some((name, heading)) => (name.trim(), Some(heading.trim())),
            None => (reference.trim(), None),
        };
        let heading = heading.filter(|h| !h.is_empty() && !h.starts_with('^'));

        if name.is_empty() {
            // Link to a heading of the same note.
            let Some(heading) = heading else {
                return Outcome::Unresolved;
            };
            let text = alias.unwrap_or(heading);
            return Outcome::Rewritten(format!("[{text}](#{})", anchorize(heading)));
        }

        let Some(target) = self.resolve(name, note_path) else {
            return Outcome::Unresolved;
        };
        let url = self.url_for(target, heading);

        match target {
            LinkTarget::Note { .. } => {
                let text = match (alias, heading) {
                    (Some(alias), _) => alias.to_string(),
                    (None, Some(heading)) => format!("{name} > {heading}"),
                    (None, None) => name.to_string(),
                };
                Outcome::Rewritten(format!("[{text}]({url})"))
            }
            LinkTarget::Asset { .. } => {
                // `![[image.png|300]]` carries a width, not a caption.
                let text = alias
                    .filter(|a| !is_dimension(a))
                    .unwrap_or(name);
                let bang = if embed { "!" } else { "" };
                Outcome::Rewritten(format!("{bang}[{text}]({url})"))
            }
        }
    }

    fn rewrite_markdown_link(
        &self,
        text: &str,
        target: &str,
        embed: bool,
        note_path: &Path,
    ) -> Outcome {
        let target = target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .unwrap_or(target);
        if is_external(target) {
            return Outcome::Ignored;
        }

        let (reference, fragment) = match target.split_once('#') {
            Some((reference, fragment)) => (reference, Some(fragment)),
            None => (target, None),
        };
        let fragment = fragment
            .map(|f| urlencoding::decode(f).map_or_else(|_| f.to_string(), |d| d.into_owned()))
            .filter(|f| !f.starts_with('^'));
        let reference = urlencoding::decode(reference)
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| reference.to_string());

        let Some(resolved) = self.resolve(&reference, note_path) else {
            return Outcome::Unresolved;
        };
        let url = self.url_for(resolved, fragment.as_deref());
        let bang = if embed { "!" } else { "" };
        Outcome::Rewritten(format!("{bang}[{text}]({url})"))
    }

    fn candidates(&self, reference: &str, from: &Path) -> Vec<String> {
        let reference = reference.trim().replace('\\', "/");
        let reference = reference.strip_prefix("./").unwrap_or(&reference);
        if reference.is_empty() {
            return Vec::new();
        }

        let mut keys = Vec::with_capacity(2);
        if let Some(dir) = from.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Some(joined) = normalize(&dir.join(reference)) {
                keys.push(joined);
            }
        }
        if let Some(direct) = normalize(Path::new(reference)) {
            keys.push(direct);
        }
        keys
    }

    fn report_unresolved(&self, link: &str, note_path: &Path) {
        let excluded = LINK_REGEX
            .captures(link)
            .and_then(|caps| {
                let reference = caps
                    .name("wiki")
                    .map(|m| m.as_str().split(['|', '#']).next().unwrap_or_default().to_string())
                    .or_else(|| caps.name("target").map(|m| m.as_str().to_string()))?;
                let reference = urlencoding::decode(&reference)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or(reference);
                Some(
                    self.candidates(&reference, note_path)
                        .iter()
                        .any(|key| self.excluded.contains(&key.to_lowercase())),
                )
            })
            .unwrap_or(false);

        if excluded {
            debug!(note = %note_path.display(), link, "link points at an excluded note");
        } else {
            warn!(note = %note_path.display(), link, "unresolved internal link");
        }
    }
}

fn full_keys(path: &Path, is_note: bool) -> Vec<String> {
    let full = slash_path(path);
    let mut keys = vec![full.clone()];
    if is_note {
        if let Some((without_ext, _)) = full.rsplit_once('.') {
            keys.push(without_ext.to_string());
        }
    }
    keys
}

fn short_keys(path: &Path, is_note: bool) -> Vec<String> {
    let mut keys = Vec::with_capacity(2);
    if let Some(name) = path.file_name() {
        keys.push(name.to_string_lossy().into_owned());
    }
    if is_note {
        if let Some(stem) = path.file_stem() {
            keys.push(stem.to_string_lossy().into_owned());
        }
    }
    keys
}

/// Collapse `.` and `..` components; `None` if the path escapes the vault.
fn normalize(path: &Path) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn is_external(target: &str) -> bool {
    if target.starts_with(['#', '/']) {
        return true;
    }
    // URL scheme such as `https:` or `mailto:`.
    match target.split_once(':') {
        Some((scheme, _)) => {
            scheme.len() > 1
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

fn is_dimension(alias: &str) -> bool {
    !alias.is_empty()
        && alias
            .split('x')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use omh_core::slug::convert_name;
    use omh_core::FrontMatter;
    use omh_vault::{ObsidianAsset, ObsidianNote};

    fn directory() -> ObsidianDirectory {
        let mut directory = ObsidianDirectory {
            root: PathBuf::from("/vault"),
            notes: vec![
                ObsidianNote::new("Note A.md", FrontMatter::new(), ""),
                ObsidianNote::new("Note B.md", FrontMatter::new(), ""),
                ObsidianNote::new("Projects/Roadmap.md", FrontMatter::new(), ""),
                ObsidianNote::new("Projects/Note B.md", FrontMatter::new(), ""),
            ],
            assets: vec![
                ObsidianAsset::new("Attachments/My Diagram.png"),
                ObsidianAsset::new("Projects/plan.pdf"),
            ],
            excluded: vec![PathBuf::from("Secret.md")],
            ..ObsidianDirectory::default()
        };
        directory.resolve_names(&convert_name);
        directory
    }

    fn rewrite(body: &str) -> Rewritten {
        LinkRewriter::new(&directory(), "posts").rewrite(body, Path::new("Note A.md"))
    }

    #[test]
    fn wikilink_to_note_uses_slug() {
        let result = rewrite("See [[Note B]] now");
        assert_eq!(result.body, "See [Note B](/posts/note-b/) now");
        assert_eq!(result.resolved, 1);
        assert!(result.unresolved.is_empty());
    }

    #[test]
    fn wikilink_alias_and_heading() {
        let result = rewrite("[[Note B#Some Heading|read this]] and [[Projects/Roadmap#Q1 Goals]]");
        assert_eq!(
            result.body,
            "[read this](/posts/note-b/#some-heading) and [Projects/Roadmap > Q1 Goals](/posts/roadmap/#q1-goals)"
        );
    }

    #[test]
    fn lookup_is_case_insensitive_and_prefers_full_paths() {
        let result = rewrite("[[note b]] [[projects/note b]]");
        let directory = directory();
        let nested = directory
            .slug_for(Path::new("Projects/Note B.md"))
            .unwrap()
            .to_string();
        assert_eq!(
            result.body,
            format!("[note b](/posts/note-b/) [projects/note b](/posts/{nested}/)")
        );
    }

    #[test]
    fn paths_differing_only_in_case_resolve_to_their_own_note() {
        let mut directory = ObsidianDirectory {
            notes: vec![
                ObsidianNote::new("Foo.md", FrontMatter::new(), ""),
                ObsidianNote::new("foo.md", FrontMatter::new(), ""),
            ],
            ..ObsidianDirectory::default()
        };
        directory.resolve_names(&convert_name);
        let lower = directory.slug_for(Path::new("foo.md")).unwrap().to_string();
        assert_ne!(lower, "foo");

        let rewriter = LinkRewriter::new(&directory, "posts");
        let result = rewriter.rewrite("[[Foo]] [[foo]] [[FOO]]", Path::new("Index.md"));
        assert_eq!(
            result.body,
            format!("[Foo](/posts/foo/) [foo](/posts/{lower}/) [FOO](/posts/foo/)")
        );
    }

    #[test]
    fn relative_links_resolve_from_the_note_directory() {
        let rewriter = LinkRewriter::new(&directory(), "posts");
        let from = Path::new("Projects/Roadmap.md");
        let result = rewriter.rewrite("[[Note B]] and [plan](plan.pdf) and [up](../Note%20A.md)", from);
        let nested = directory()
            .slug_for(Path::new("Projects/Note B.md"))
            .unwrap()
            .to_string();
        assert_eq!(
            result.body,
            format!("[Note B](/posts/{nested}/) and [plan](/posts/projects/plan.pdf) and [up](/posts/note-a/)")
        );
    }

    #[test]
    fn embeds_point_into_static_tree() {
        let result = rewrite("![[My Diagram.png|300]] and ![[My Diagram.png|A diagram]]");
        assert_eq!(
            result.body,
            "![My Diagram.png](/posts/attachments/My%20Diagram.png) and ![A diagram](/posts/attachments/My%20Diagram.png)"
        );
    }

    #[test]
    fn markdown_image_is_rewritten() {
        let result = rewrite("![alt](Attachments/My%20Diagram.png)");
        assert_eq!(result.body, "![alt](/posts/attachments/My%20Diagram.png)");
    }

    #[test]
    fn unresolved_links_are_left_untouched() {
        let body = "Missing [[Nowhere|x]] and [doc](missing.md) and ![[gone.png]]";
        let result = rewrite(body);
        assert_eq!(result.body, body);
        assert_eq!(
            result.unresolved,
            vec!["[[Nowhere|x]]", "[doc](missing.md)", "![[gone.png]]"]
        );
    }

    #[test]
    fn links_to_excluded_notes_stay_unresolved() {
        let body = "See [[Secret]]";
        let result = rewrite(body);
        assert_eq!(result.body, body);
        assert_eq!(result.unresolved, vec!["[[Secret]]"]);
    }

    #[test]
    fn external_links_are_ignored() {
        let body = "[site](https://example.com) [mail](mailto:a@b.c) [top](#intro) [abs](/posts/x/)";
        let result = rewrite(body);
        assert_eq!(result.body, body);
        assert!(result.unresolved.is_empty());
        assert_eq!(result.resolved, 0);
    }

    #[test]
    fn code_is_protected() {
        let body = "`[[Note B]]`\n\n```\n[[Note B]]\n```\n\n[[Note B]]";
        let result = rewrite(body);
        assert_eq!(
            result.body,
            "`[[Note B]]`\n\n```\n[[Note B]]\n```\n\n[Note B](/posts/note-b/)"
        );
    }

    #[test]
    fn same_note_heading_link_becomes_anchor() {
        let result = rewrite("[[#Getting Started]]");
        assert_eq!(result.body, "[Getting Started](#getting-started)");
    }

    #[test]
    fn heading_fragments_use_hugo_anchors() {
        let result = rewrite("[[Note B#iOS Setup]] [[Note B#v1.2 Notes]] [[Note B#HTTPServer]]");
        assert_eq!(
            result.body,
            "[Note B > iOS Setup](/posts/note-b/#ios-setup) \
             [Note B > v1.2 Notes](/posts/note-b/#v12-notes) \
             [Note B > HTTPServer](/posts/note-b/#httpserver)"
        );
    }

    #[test]
    fn markdown_link_fragments_use_hugo_anchors() {
        let result = rewrite("[setup](Note%20B.md#iOS%20Setup) and [block](Note%20B.md#^abc123)");
        assert_eq!(
            result.body,
            "[setup](/posts/note-b/#ios-setup) and [block](/posts/note-b/)"
        );
    }

    #[test]
    fn block_references_drop_the_fragment() {
        let result = rewrite("[[Note B#^abc123]]");
        assert_eq!(result.body, "[Note B](/posts/note-b/)");
    }

    #[test]
    fn rewriting_is_deterministic() {
        let body = "[[Note B]] [[Projects/Note B]] ![[My Diagram.png]]";
        assert_eq!(rewrite(body), rewrite(body));
    }

    #[test]
    fn escaped_pipe_in_tables() {
        let result = rewrite("| [[Note B\\|B]] |");
        assert_eq!(result.body, "| [B](/posts/note-b/) |");
    }

    #[test]
    fn dimensions_are_detected() {
        assert!(is_dimension("300"));
        assert!(is_dimension("300x200"));
        assert!(!is_dimension("x200"));
        assert!(!is_dimension("A diagram"));
    }
}
