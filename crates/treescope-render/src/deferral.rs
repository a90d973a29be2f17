#![forbid(unsafe_code)]

//! Deferred rendering of expensive labels.

use treescope_core::RenderConfig;
use treescope_parts::Part;
use treescope_parts::builders::{deferred, deferred_placeholder_style};

/// Build `main` lazily when the configuration defers summaries.
///
/// The placeholder is built immediately and must not inspect expensive data;
/// its metrics drive the layout. `main` runs on first emission. Without
/// deferral `main` runs now and the placeholder is never built.
pub fn maybe_defer_rendering<M, P>(config: &RenderConfig, main: M, placeholder: P) -> Part
where
    M: FnOnce() -> Part + 'static,
    P: FnOnce() -> Part,
{
    if config.defer_summaries {
        deferred(deferred_placeholder_style(placeholder()), main)
    } else {
        main()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use treescope_parts::builders::text;
    use treescope_parts::{PartKind, RenderContext, TextOptions, render_to_text};

    #[test]
    fn deferred_main_runs_once_on_emission() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let part = maybe_defer_rendering(
            &RenderConfig::default(),
            move || {
                counter.set(counter.get() + 1);
                text("real")
            },
            || text("..."),
        );
        assert!(matches!(part.kind(), PartKind::Deferred(_)));
        assert_eq!(part.collapsed_width(), Ok(3));
        assert_eq!(calls.get(), 0);

        let mut ctx = RenderContext::new();
        for _ in 0..2 {
            let out = render_to_text(&part, TextOptions::default(), &mut ctx).unwrap();
            assert_eq!(out, "real");
        }
        assert_eq!(calls.get(), 1);
        assert_eq!(ctx.deferreds_forced(), 1);
    }

    #[test]
    fn eager_when_deferral_disabled() {
        let config = RenderConfig {
            defer_summaries: false,
            ..RenderConfig::default()
        };
        let part = maybe_defer_rendering(&config, || text("real"), || unreachable!());
        assert!(matches!(part.kind(), PartKind::Text(_)));
    }
}
