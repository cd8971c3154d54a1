use super::escape;

pub const DEFAULT_TOAST_MS: u32 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    fn class(self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Info => "info",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Severity::Success => "fa-check-circle",
            Severity::Error => "fa-times-circle",
            Severity::Info => "fa-info-circle",
        }
    }
}

/// Transient notification. Each toast dismisses itself after its own
/// duration, so several can be on screen at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub severity: Severity,
    pub message: String,
    pub duration_ms: u32,
}

impl Toast {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            duration_ms: DEFAULT_TOAST_MS,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }
}

pub fn render_toasts(toasts: &[Toast]) -> String {
    toasts
        .iter()
        .map(|toast| {
            format!(
                r#"<div class="toast {class}" data-duration="{duration}"><i class="fas {icon} fa-icon"></i><span>{message}</span></div>"#,
                class = toast.severity.class(),
                duration = toast.duration_ms,
                icon = toast.severity.icon(),
                message = escape(&toast.message),
            )
        })
        .collect()
}

/// Advisory progress indicator. The page script animates the visible bar
/// toward `target`; nothing waits on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loader {
    pub message: String,
    target: u8,
}

impl Loader {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            target: 0,
        }
    }

    pub fn target(&self) -> u8 {
        self.target
    }

    pub fn set_target(&mut self, percent: i32) {
        self.target = percent.clamp(0, 100) as u8;
    }

    pub fn with_target(mut self, percent: i32) -> Self {
        self.set_target(percent);
        self
    }

    /// Attributes that arm a form to raise the loader when submitted.
    pub fn form_attributes(&self) -> String {
        format!(
            r#"data-loader="{}" data-loader-target="{}""#,
            escape(&self.message),
            self.target
        )
    }
}

pub fn render_loader() -> &'static str {
    r#"<div id="loader-overlay" class="loader-overlay">
      <div class="loader-card">
        <div class="loader-track"><div id="loaderProgressBar" class="loader-bar"></div></div>
        <p id="loaderProgressText">Loading...</p>
      </div>
    </div>"#
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    Link(String),
    Post {
        action: String,
        fields: Vec<(String, String)>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalAction {
    pub label: String,
    pub class: String,
    pub kind: ActionKind,
}

impl ModalAction {
    pub fn link(label: impl Into<String>, class: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            class: class.into(),
            kind: ActionKind::Link(href.into()),
        }
    }

    pub fn post(
        label: impl Into<String>,
        class: impl Into<String>,
        action: impl Into<String>,
        fields: Vec<(String, String)>,
    ) -> Self {
        Self {
            label: label.into(),
            class: class.into(),
            kind: ActionKind::Post {
                action: action.into(),
                fields,
            },
        }
    }
}

/// Blocking confirmation dialog. Every action hides the dialog before it
/// navigates or submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub title: String,
    pub message: String,
    pub actions: Vec<ModalAction>,
}

impl Modal {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            actions: Vec::new(),
        }
    }

    pub fn action(mut self, action: ModalAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Single-button notice that closes back to `href`.
    pub fn notice(title: impl Into<String>, message: impl Into<String>, href: &str) -> Self {
        Self::new(title, message).action(ModalAction::link("OK", "btn btn-primary", href))
    }
}

pub fn render_modal(modal: Option<&Modal>) -> String {
    let Some(modal) = modal else {
        return String::new();
    };

    let buttons: String = modal
        .actions
        .iter()
        .map(|action| match &action.kind {
            ActionKind::Link(href) => format!(
                r#"<a class="{class}" href="{href}" data-dismiss-modal>{label}</a>"#,
                class = escape(&action.class),
                href = escape(href),
                label = escape(&action.label),
            ),
            ActionKind::Post { action: target, fields } => {
                let hidden: String = fields
                    .iter()
                    .map(|(name, value)| {
                        format!(
                            r#"<input type="hidden" name="{}" value="{}" />"#,
                            escape(name),
                            escape(value)
                        )
                    })
                    .collect();
                format!(
                    r#"<form method="post" action="{target}">{hidden}<button type="submit" class="{class}" data-dismiss-modal>{label}</button></form>"#,
                    target = escape(target),
                    class = escape(&action.class),
                    label = escape(&action.label),
                )
            }
        })
        .collect();

    format!(
        r#"<div id="custom-modal-overlay" class="modal-overlay show" role="dialog" aria-modal="true">
      <div class="modal-card">
        <h3 id="modal-title">{title}</h3>
        <p id="modal-message">{message}</p>
        <div id="modal-buttons" class="modal-buttons">{buttons}</div>
      </div>
    </div>"#,
        title = escape(&modal.title),
        message = escape(&modal.message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toasts_default_to_three_seconds() {
        assert_eq!(Toast::info("hi").duration_ms, 3000);
    }

    #[test]
    fn each_toast_renders_separately() {
        let html = render_toasts(&[Toast::success("Saved"), Toast::error("<oops>")]);
        assert_eq!(html.matches(r#"class="toast "#).count(), 2);
        assert!(html.contains(r#"class="toast success""#));
        assert!(html.contains("&lt;oops&gt;"));
    }

    #[test]
    fn loader_target_is_clamped() {
        let mut loader = Loader::new("Adding task...");
        loader.set_target(140);
        assert_eq!(loader.target(), 100);
        loader.set_target(-3);
        assert_eq!(loader.target(), 0);
        assert!(
            Loader::new("Saving").with_target(75).form_attributes()
                .contains(r#"data-loader-target="75""#)
        );
    }

    #[test]
    fn modal_renders_every_action_as_dismissing() {
        let modal = Modal::new("Confirm", "Sure?")
            .action(ModalAction::link("Cancel", "btn btn-danger", "/performance"))
            .action(ModalAction::post(
                "Confirm",
                "btn btn-success",
                "/performance/tasks/done",
                vec![("taskId".into(), "T-1".into())],
            ));
        let html = render_modal(Some(&modal));
        assert_eq!(html.matches("data-dismiss-modal").count(), 2);
        assert!(html.contains(r#"name="taskId" value="T-1""#));
        assert!(render_modal(None).is_empty());
    }
}
