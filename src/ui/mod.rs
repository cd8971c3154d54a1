pub mod components;
pub mod feedback;
pub mod views;

use crate::branding::Branding;
use crate::preferences::Theme;
use feedback::{Modal, Toast, render_loader, render_modal, render_toasts};

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Everything around a page body: branding, theme, signed-in user and the
/// feedback layer.
pub struct Chrome<'a> {
    pub title: &'a str,
    pub path: &'a str,
    pub theme: Theme,
    pub branding: &'a Branding,
    pub user_name: Option<&'a str>,
    pub toasts: &'a [Toast],
    pub modal: Option<&'a Modal>,
}

pub fn render_page(chrome: &Chrome<'_>, body: &str) -> String {
    let user = match chrome.user_name {
        Some(name) => format!(
            r#"<span class="user">Signed in as <strong id="userName">{}</strong></span><a class="btn" href="/logout">Sign out</a>"#,
            escape(name)
        ),
        None => String::new(),
    };

    let title = escape(chrome.title);
    let return_to = escape(chrome.path);
    let org = escape(&chrome.branding.org);
    let tagline = escape(&chrome.branding.tagline);
    let mobile = escape(&chrome.branding.mobile);
    let address = escape(&chrome.branding.address);
    let toasts = render_toasts(chrome.toasts);
    let modal = render_modal(chrome.modal);

    fill(
        PAGE_HTML,
        &[
            ("TITLE", title.as_str()),
            ("THEME_CLASS", chrome.theme.body_class()),
            ("THEME_NAME", chrome.theme.name()),
            ("RETURN_TO", return_to.as_str()),
            ("ORG", org.as_str()),
            ("TAGLINE", tagline.as_str()),
            ("MOBILE", mobile.as_str()),
            ("ADDRESS", address.as_str()),
            ("USER", user.as_str()),
            ("LOADER", render_loader()),
            ("TOASTS", toasts.as_str()),
            ("MODAL", modal.as_str()),
            ("BODY", body),
        ],
    )
}

/// Substitutes `{{KEY}}` markers in a single pass over `template`. Values
/// are copied as they are and never scanned for markers themselves.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let found = after.find("}}").and_then(|end| {
            values
                .iter()
                .find(|(key, _)| *key == &after[..end])
                .map(|(_, value)| (*value, end))
        });
        match found {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}} · {{ORG}}</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css" />
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --muted: #6b645d;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --surface: white;
      --line: rgba(47, 72, 88, 0.08);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
      --ok: #2d7a4b;
      --bad: #c63b2b;
      --wait: #b7791f;
    }

    body.theme-dark {
      --bg-1: #1b1f24;
      --bg-2: #2f4858;
      --ink: #f1ede6;
      --muted: #b4aca3;
      --card: rgba(32, 37, 43, 0.92);
      --surface: #262c33;
      --line: rgba(255, 255, 255, 0.08);
    }

    body.theme-light {
      --bg-1: #ffffff;
      --bg-2: #eef3f6;
      --card: rgba(255, 255, 255, 0.98);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), var(--bg-1) 60%, var(--bg-2) 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1100px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
      animation: rise 600ms ease;
    }

    header.top, footer {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 14px;
      font-size: 1.3rem;
    }

    .subtitle, .hint {
      margin: 0;
      color: var(--muted);
    }

    .card {
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 28px;
    }

    .grid-2 {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 24px;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 16px;
    }

    .stat {
      background: var(--surface);
      border-radius: 18px;
      padding: 18px;
      border: 1px solid var(--line);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .status-on-time { color: var(--ok); }
    .status-late { color: var(--bad); }
    .status-pending { color: var(--wait); }

    form {
      display: grid;
      gap: 12px;
    }

    .inline-form {
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      align-items: center;
      margin-bottom: 18px;
    }

    input, select, textarea {
      font: inherit;
      padding: 10px 14px;
      border-radius: 12px;
      border: 1px solid var(--line);
      background: var(--surface);
      color: var(--ink);
    }

    .btn {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      text-decoration: none;
      text-align: center;
      color: var(--ink);
      background: var(--line);
      display: inline-flex;
      align-items: center;
      justify-content: center;
      gap: 8px;
    }

    .btn-primary { background: var(--accent-2); color: white; }
    .btn-success, .btn-mark-done { background: var(--ok); color: white; }
    .btn-danger { background: var(--bad); color: white; }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      text-align: left;
      padding: 10px 8px;
      border-bottom: 1px solid var(--line);
    }

    .task-list {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(240px, 1fr));
      gap: 16px;
    }

    .task-card {
      background: var(--surface);
      border: 1px solid var(--line);
      border-radius: 18px;
      padding: 16px;
    }

    .task-card h3 { margin: 0 0 6px; }

    .loader-overlay, .modal-overlay {
      position: fixed;
      inset: 0;
      display: none;
      place-items: center;
      background: rgba(20, 24, 28, 0.45);
      z-index: 40;
    }

    .loader-overlay.show, .modal-overlay.show { display: grid; }

    .loader-card, .modal-card {
      background: var(--surface);
      border-radius: 20px;
      padding: 24px;
      width: min(420px, 90vw);
      box-shadow: var(--shadow);
    }

    .loader-track {
      height: 8px;
      border-radius: 999px;
      background: var(--line);
      overflow: hidden;
    }

    .loader-bar {
      height: 100%;
      width: 0%;
      background: var(--accent);
      transition: width 20ms linear;
    }

    .modal-buttons {
      display: flex;
      gap: 10px;
      justify-content: flex-end;
    }

    .modal-buttons form { display: inline; }

    #toast-container {
      position: fixed;
      top: 18px;
      right: 18px;
      display: grid;
      gap: 10px;
      z-index: 50;
    }

    .toast {
      padding: 12px 18px;
      border-radius: 14px;
      color: white;
      display: flex;
      gap: 10px;
      align-items: center;
      opacity: 0;
      transform: translateX(24px);
      transition: opacity 250ms ease, transform 250ms ease;
    }

    .toast.show { opacity: 1; transform: translateX(0); }
    .toast.hide { opacity: 0; transform: translateX(24px); }
    .toast.success { background: var(--ok); }
    .toast.error { background: var(--bad); }
    .toast.info { background: var(--accent-2); }

    @keyframes rise {
      from { opacity: 0; transform: translateY(18px); }
      to { opacity: 1; transform: translateY(0); }
    }
  </style>
</head>
<body class="{{THEME_CLASS}}" data-theme="{{THEME_NAME}}">
  <main class="app">
    <header class="top">
      <div id="orgInfo">
        <h1>{{ORG}}</h1>
        <p class="subtitle">{{TAGLINE}}</p>
      </div>
      <div class="actions">
        {{USER}}
        <form method="post" action="/theme" style="display:inline">
          <input type="hidden" name="return_to" value="{{RETURN_TO}}" />
          <button class="btn" type="submit"><i class="fas fa-palette"></i> Theme</button>
        </form>
      </div>
    </header>

    {{BODY}}

    <footer id="contactInfo" class="hint">
      <p>Mobile: {{MOBILE}}</p>
      <p>Address: {{ADDRESS}}</p>
    </footer>
  </main>

  {{LOADER}}
  <div id="toast-container">{{TOASTS}}</div>
  {{MODAL}}

  <script>
    const overlay = document.getElementById('loader-overlay');
    const bar = document.getElementById('loaderProgressBar');
    const text = document.getElementById('loaderProgressText');
    let current = 0;
    let target = 0;
    let ticker = null;

    const showLoader = (message, goal) => {
      text.textContent = message || 'Loading...';
      current = 0;
      target = Math.min(100, Math.max(0, goal));
      bar.style.width = '0%';
      overlay.classList.add('show');
      clearInterval(ticker);
      ticker = setInterval(() => {
        if (current < target) {
          current += 1;
          bar.style.width = `${current}%`;
        }
      }, 20);
    };

    document.querySelectorAll('form[data-loader]').forEach((form) => {
      form.addEventListener('submit', () => {
        showLoader(form.dataset.loader, Number(form.dataset.loaderTarget || 90));
      });
    });

    document.querySelectorAll('.toast').forEach((toast) => {
      const duration = Number(toast.dataset.duration || 3000);
      setTimeout(() => toast.classList.add('show'), 10);
      setTimeout(() => {
        toast.classList.remove('show');
        toast.classList.add('hide');
        toast.addEventListener('transitionend', () => toast.remove(), { once: true });
      }, duration);
    });

    document.querySelectorAll('time[data-local-date]').forEach((time) => {
      const when = new Date(time.getAttribute('datetime'));
      if (!Number.isNaN(when.getTime())) {
        time.textContent = when
          .toLocaleDateString('en-GB', { day: '2-digit', month: 'short', year: 'numeric' })
          .replace(/ /g, '-');
      }
    });

    document.querySelectorAll('[data-dismiss-modal]').forEach((action) => {
      action.addEventListener('click', () => {
        const modal = document.getElementById('custom-modal-overlay');
        if (modal) {
          modal.classList.remove('show');
        }
      });
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome<'a>(branding: &'a Branding, toasts: &'a [Toast]) -> Chrome<'a> {
        Chrome {
            title: "Admin",
            path: "/admin",
            theme: Theme::Dark,
            branding,
            user_name: Some("Asha <admin>"),
            toasts,
            modal: None,
        }
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn page_applies_theme_branding_and_user() {
        let branding = Branding::default();
        let html = render_page(&chrome(&branding, &[]), "<p>body</p>");
        assert!(html.contains(r#"<body class="theme-dark" data-theme="dark">"#));
        assert!(html.contains("<h1>Task Manager</h1>"));
        assert!(html.contains("Asha &lt;admin&gt;"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains(r#"name="return_to" value="/admin""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn page_carries_all_queued_toasts() {
        let branding = Branding::default();
        let toasts = [Toast::success("Employee added"), Toast::info("Heads up")];
        let html = render_page(&chrome(&branding, &toasts), "");
        assert!(html.contains("Employee added"));
        assert!(html.contains("Heads up"));
    }

    #[test]
    fn markers_inside_content_are_left_alone() {
        let branding = Branding {
            org: "{{TOASTS}} Org".into(),
            ..Branding::default()
        };
        let toasts = [Toast::error("Failed to load tasks: {{BODY}}")];
        let mut page = chrome(&branding, &toasts);
        page.user_name = Some("{{MODAL}}");
        let html = render_page(&page, "<p>SECRET-BODY</p>");

        assert_eq!(html.matches("SECRET-BODY").count(), 1);
        assert!(html.contains("Failed to load tasks: {{BODY}}"));
        assert!(html.contains(r#"<strong id="userName">{{MODAL}}</strong>"#));
        assert!(html.contains("<h1>{{TOASTS}} Org</h1>"));
        assert_eq!(html.matches("Failed to load tasks").count(), 1);
    }

    #[test]
    fn fill_keeps_unknown_markers() {
        assert_eq!(fill("a {{X}} b {{Y}} {{", &[("X", "{{Y}}")]), "a {{Y}} b {{Y}} {{");
    }
}
