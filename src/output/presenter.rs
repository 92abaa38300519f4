use std::io::{self, Write};

use super::config::{OutputConfig, OutputFormat};
use super::types::Envelope;

pub trait Presenter: Send + Sync {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()>;
}

pub struct JsonPresenter { pub pretty: bool }
impl Presenter for JsonPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        if self.pretty { serde_json::to_writer_pretty(&mut *w, env).map_err(to_io)? } else { serde_json::to_writer(&mut *w, env).map_err(to_io)? }
        writeln!(w)
    }
}

/// One human line per envelope; the full payload only when pretty is on.
pub struct TextPresenter { pub pretty: bool }
impl Presenter for TextPresenter {
    fn emit(&self, env: &Envelope, w: &mut dyn Write) -> io::Result<()> {
        match (&env.summary, env.apply) {
            (Some(line), _) => writeln!(w, "{}", line)?,
            (None, true) => writeln!(w, "Result: {}", env.op)?,
            (None, false) => writeln!(w, "Plan: {}", env.op)?,
        }
        if self.pretty {
            let body = if env.apply { &env.result } else { &env.plan };
            if let Some(v) = body { serde_json::to_writer_pretty(&mut *w, v).map_err(to_io)?; writeln!(w)?; }
        }
        Ok(())
    }
}

pub struct Emitter {
    presenter: Box<dyn Presenter>,
}

impl Emitter {
    pub fn from_env(cfg: OutputConfig) -> Self {
        let presenter: Box<dyn Presenter> = match cfg.format {
            OutputFormat::Json => Box::new(JsonPresenter { pretty: cfg.pretty }),
            OutputFormat::Text => Box::new(TextPresenter { pretty: cfg.pretty }),
        };
        Emitter { presenter }
    }

    pub fn emit(&self, env: &Envelope) -> io::Result<()> {
        let mut out = io::stdout();
        self.presenter.emit(env, &mut out)?;
        out.flush()
    }
}

fn to_io(e: serde_json::Error) -> io::Error { io::Error::new(io::ErrorKind::Other, e) }

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(p: &dyn Presenter, env: &Envelope) -> String {
        let mut buf: Vec<u8> = Vec::new();
        p.emit(env, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_prints_summary_line() {
        let env = Envelope::result("scan", &json!({"exported": 2}), None).unwrap()
            .with_summary(Some("Exported 2 jobs to weekly_jobs.xlsx".into()));
        assert_eq!(render(&TextPresenter { pretty: false }, &env), "Exported 2 jobs to weekly_jobs.xlsx\n");
    }

    #[test]
    fn text_falls_back_to_op_name() {
        let env = Envelope::plan("scan", &json!({"urls": 8}), None).unwrap();
        assert_eq!(render(&TextPresenter { pretty: false }, &env), "Plan: scan\n");
    }

    #[test]
    fn json_is_one_line_envelope() {
        let env = Envelope::result("scan", &json!({"exported": 0}), None).unwrap();
        let s = render(&JsonPresenter { pretty: false }, &env);
        assert_eq!(s.lines().count(), 1);
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["op"], "scan");
        assert_eq!(v["result"]["exported"], 0);
    }
}
