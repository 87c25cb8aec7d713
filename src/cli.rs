// src/cli.rs
use std::{env, error::Error, fs, path::{Path, PathBuf}};
use std::sync::{Arc, atomic::AtomicBool};

use url::Url;

use crate::config::consts::{CONFIG_FILE, LOG_FILE};
use crate::config::file;
use crate::config::options::{AppOptions, ForeignKey};
use crate::core::sanitize::{normalize_name, split_csv};
use crate::engine::StyleSink;
use crate::page::Document;
use crate::page::form::{self, Form, HttpTransport, SubmitOutcome};
use crate::page::summary::{HttpLabelSource, LabelSource};
use crate::runner;
use crate::status::{DocumentStatus, StatusSink, Tee};

/// Parsed command line. Option overrides are kept separate so they can be
/// layered over the config file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub url: Option<String>,
    pub config: Option<PathBuf>,
    pub hide: Vec<String>,
    pub columns: Vec<String>,
    pub pin: Vec<String>,
    pub no_auto_hide: bool,
    pub max_cells: Option<usize>,
    pub debounce_ms: Option<u64>,
    pub labels: bool,
    pub base_url: Option<String>,
    pub fks: Vec<(String, ForeignKey)>,
    pub aliases: Vec<(String, String)>,
    pub watch: bool,
    pub defaults: bool,
    pub submit: Option<String>,
    pub print_css: bool,
    pub help: bool,
}

impl CliArgs {
    /// Layer the flags over `opts` (file settings or defaults).
    pub fn apply(&self, opts: &mut AppOptions) {
        opts.rules.deny.extend(self.hide.iter().flat_map(|v| split_csv(v)).map(normalize_name));
        opts.rules.allow.extend(self.columns.iter().flat_map(|v| split_csv(v)).map(normalize_name));
        opts.rules.pinned.extend(self.pin.iter().flat_map(|v| split_csv(v)).map(normalize_name));
        if self.no_auto_hide { opts.engine.auto_hide_empty = false; }
        if let Some(n) = self.max_cells { opts.engine.max_cells = n; }
        if let Some(ms) = self.debounce_ms { opts.host.debounce_ms = ms; }
        if self.labels { opts.labels.enabled = true; }
        if let Some(b) = &self.base_url { opts.labels.base_url = b.clone(); }
        for (k, fk) in &self.fks {
            opts.labels.foreign_keys.insert(k.clone(), fk.clone());
        }
        for (k, a) in &self.aliases {
            opts.labels.aliases.insert(k.clone(), a.clone());
        }
        opts.host.out_path = self.output.clone();
    }
}

fn key_value(flag: &str, v: &str) -> Result<(String, String), Box<dyn Error + Send + Sync>> {
    let (k, val) = v.split_once('=').ok_or_else(|| format!("{flag}: expected key=value, got '{v}'"))?;
    Ok((k.trim().to_ascii_lowercase(), s!(val.trim())))
}

/// Parse arguments (without the program name).
pub fn parse_args<I>(args: I) -> Result<CliArgs, Box<dyn Error + Send + Sync>>
where
    I: IntoIterator<Item = String>,
{
    let mut out = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        let mut value = |what: &str| args.next().ok_or_else(|| format!("Missing value for {what}"));
        match a.as_str() {
            "--in" | "-i" => out.input = Some(PathBuf::from(value("--in")?)),
            "--out" | "-o" => out.output = Some(PathBuf::from(value("--out")?)),
            "--url" | "-u" => out.url = Some(value("--url")?),
            "--config" => out.config = Some(PathBuf::from(value("--config")?)),
            "--hide" => out.hide.push(value("--hide")?),
            "--columns" => out.columns.push(value("--columns")?),
            "--pin" => out.pin.push(value("--pin")?),
            "--no-auto-hide" => out.no_auto_hide = true,
            "--max-cells" => out.max_cells = Some(value("--max-cells")?.parse()?),
            "--debounce-ms" => out.debounce_ms = Some(value("--debounce-ms")?.parse()?),
            "--labels" => out.labels = true,
            "--base-url" => out.base_url = Some(value("--base-url")?),
            "--fk" => {
                let (k, spec) = key_value("--fk", &value("--fk")?)?;
                let fk = ForeignKey::parse(&spec).ok_or_else(|| format!("--fk {k}: expected db/table/label_col"))?;
                out.fks.push((k, fk));
            }
            "--alias" => {
                let kv = key_value("--alias", &value("--alias")?)?;
                out.aliases.push(kv);
            }
            "--watch" | "-w" => out.watch = true,
            "--defaults" => out.defaults = true,
            "--submit" => out.submit = Some(value("--submit")?),
            "--print-css" => out.print_css = true,
            "-h" | "--help" => out.help = true,
            _ => return Err(format!("Unknown arg: {a}").into()),
        }
    }
    Ok(out)
}

pub fn run() -> Result<(), Box<dyn Error + Send + Sync>> {
    let args = parse_args(env::args().skip(1))?;
    if args.help {
        eprintln!("{}", include_str!("cli_help.txt"));
        return Ok(());
    }
    let input = args.input.clone().ok_or("Missing --in <file> (see --help)")?;

    crate::log::init(Path::new(LOG_FILE), log::LevelFilter::Debug);
    let config_path = args.config.clone().unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let mut opts = file::load(&config_path)?;
    args.apply(&mut opts);

    let url = args.url.as_deref().map(Url::parse).transpose()?;
    logf!("CLI: in={} url={:?}", input.display(), url.as_ref().map(Url::as_str));

    let labels = if opts.labels.enabled { Some(HttpLabelSource::new(&opts.labels.base_url)?) } else { None };
    let labels_dyn = labels.as_ref().map(|l| l as &dyn LabelSource);

    if args.watch {
        // Runs until the process is interrupted.
        let stop = Arc::new(AtomicBool::new(false));
        return Ok(crate::watch::watch(
            &input,
            args.output.as_deref(),
            url.as_ref(),
            &opts,
            stop,
            |r| println!("{}", r.line()),
        )?);
    }

    let mut doc = Document::load(&input)?;
    if args.defaults {
        let n = doc.apply_input_defaults(chrono::Local::now().naive_local());
        println!("defaults: filled {n} input(s)");
    }

    let report = runner::refresh(&mut doc, url.as_ref(), &opts, labels_dyn);
    println!("{}", report.line());

    if let Some(form_id) = &args.submit {
        submit_form(&mut doc, form_id, url.as_ref(), &opts)?;
    }

    if args.print_css {
        match doc.style(&opts.engine.style_id) {
            Some(css) => println!("{css}"),
            None => println!("(no directive)"),
        }
    }

    let target = args.output.as_deref().unwrap_or(&input);
    if fs::read_to_string(target).ok().as_deref() != Some(doc.html()) {
        doc.save(target)?;
        println!("wrote {}", target.display());
    }
    Ok(())
}

struct Print;
impl StatusSink for Print {
    fn status(&mut self, msg: &str) {
        println!("{msg}");
    }
}

fn submit_form(
    doc: &mut Document,
    form_id: &str,
    url: Option<&Url>,
    opts: &AppOptions,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let form = Form::parse(doc.html(), form_id).ok_or_else(|| format!("No form with id '{form_id}'"))?;
    let base = match url {
        Some(u) => u.clone(),
        None => Url::parse(&opts.labels.base_url)?,
    };
    let status_id = opts.form.status_id.clone();
    let mut print = Print;
    let mut in_page = DocumentStatus { doc, id: &status_id };
    let mut status = Tee(&mut print, &mut in_page);
    match form::submit(&form, &base, &HttpTransport, &opts.form, &mut status) {
        SubmitOutcome::Redirect(to) => println!("redirect: {to}"),
        SubmitOutcome::Failed(_) => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s!(*s)).collect()
    }

    #[test]
    fn parses_repeatable_and_keyed_flags() {
        let a = parse_args(args(&[
            "--in", "p.html", "--hide", "a,b", "--hide", "c", "--fk", "Luogo_id=output/luogo/indirizzo",
            "--alias", "luogo_id=luogo", "--no-auto-hide", "--max-cells", "10",
        ]))
        .unwrap();
        assert_eq!(a.input, Some(PathBuf::from("p.html")));
        assert_eq!(a.hide, vec!["a,b", "c"]);
        assert_eq!(a.fks[0].0, "luogo_id");
        assert_eq!(a.max_cells, Some(10));

        let mut o = AppOptions::default();
        a.apply(&mut o);
        assert_eq!(o.rules.deny, names!["a", "b", "c"]);
        assert!(!o.engine.auto_hide_empty);
        assert_eq!(o.engine.max_cells, 10);
        assert_eq!(o.labels.aliases["luogo_id"], "luogo");
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["--in"])).is_err());
        assert!(parse_args(args(&["--max-cells", "many"])).is_err());
        assert!(parse_args(args(&["--fk", "x_id=only/two"])).is_err());
        assert!(parse_args(args(&["--alias", "novalue"])).is_err());
    }
}
