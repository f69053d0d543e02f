use crate::{
    analytics::{AnalyticsEvent, CourseSectionTime, EventSink, LanguageSwitch, LearningResourceClick},
    classify::{is_outbound_href, resource_type, section_name},
    engagement::EngagementSnapshot,
    locale::LocaleChangeObserver,
    settings::EngagementSettings,
};

use super::{ClickOutcome, EventSurface, LinkClick, PageRoute, PageScope, NAVIGATION_DELAY};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Binds engagement timing and locale tracking to the page lifecycle.
///
/// Drive it from the host's event loop: `navigate` on every route the router
/// reports, `unmount` when the page component goes away, and dispatch raw
/// browser events on [`PageController::surface`].
pub struct PageController {
    sink: EventSink,
    settings: EngagementSettings,
    surface: EventSurface,
    locale_observer: LocaleChangeObserver,
    mounted: Option<PageScope>,
}

impl PageController {
    pub fn new(sink: EventSink, settings: EngagementSettings) -> Self {
        Self::with_surface(sink, settings, EventSurface::default())
    }

    pub fn with_surface(sink: EventSink, settings: EngagementSettings, surface: EventSurface) -> Self {
        Self {
            sink,
            settings,
            surface,
            locale_observer: LocaleChangeObserver::new(),
            mounted: None,
        }
    }

    pub fn surface(&self) -> &EventSurface {
        &self.surface
    }

    pub fn current_route(&self) -> Option<&PageRoute> {
        self.mounted.as_ref().map(PageScope::route)
    }

    pub async fn snapshot(&self) -> Option<EngagementSnapshot> {
        match &self.mounted {
            Some(scope) => Some(scope.snapshot().await),
            None => None,
        }
    }

    /// Mounts `route`, re-mounting when path or locale changed. Re-reporting
    /// the current route is a no-op. Returns the flushed report of the page
    /// that was left, if any.
    pub async fn navigate(&mut self, route: PageRoute) -> Option<CourseSectionTime> {
        if self.current_route() == Some(&route) {
            return None;
        }

        let left = match self.mounted.take() {
            Some(scope) => scope.teardown().await,
            None => None,
        };

        log_info!("mounting {} ({})", route.path, route.locale);
        let scope = PageScope::attach(
            route.clone(),
            self.sink.clone(),
            &self.settings,
            &self.surface,
        )
        .await;
        self.mounted = Some(scope);

        if let Some(switch) = self.locale_observer.observe(&route.locale, &route.path) {
            log_info!(
                "locale switched {} -> {} on {}",
                switch.from_locale,
                switch.to_locale,
                switch.page_path
            );
            self.sink
                .track(&AnalyticsEvent::LanguageSwitch(switch.into()));
        }

        left
    }

    /// Tears the current page down. Safe to call with nothing mounted.
    pub async fn unmount(&mut self) -> Option<CourseSectionTime> {
        let scope = self.mounted.take()?;
        log_info!("unmounting {}", scope.route().path);
        scope.teardown().await
    }

    /// Explicit language-selector report for the current page.
    pub fn track_locale_change(&self, from_locale: &str, to_locale: &str) {
        let current_page = self
            .current_route()
            .map(|route| route.path.clone())
            .unwrap_or_default();

        self.sink.track(&AnalyticsEvent::LanguageSwitch(LanguageSwitch::new(
            from_locale,
            to_locale,
            current_page,
        )));
    }

    /// Tracks an outbound resource click and tells the host how to navigate.
    pub fn resource_clicked(&self, click: &LinkClick) -> ClickOutcome {
        if !is_outbound_href(&click.href) {
            return ClickOutcome::Untracked;
        }

        let (source_section, locale) = match self.current_route() {
            Some(route) => (section_name(&route.path), route.locale.clone()),
            None => {
                log_warn!("outbound click on {} with no page mounted", click.href);
                (section_name(""), String::new())
            }
        };

        let resource_name = click
            .resource_name
            .clone()
            .unwrap_or_else(|| resource_type(&click.href).to_string());

        self.sink
            .track(&AnalyticsEvent::LearningResourceClick(LearningResourceClick::new(
                click.href.clone(),
                resource_name,
                source_section,
                locale,
            )));

        if click.opens_in_same_tab() {
            ClickOutcome::NavigateAfter(NAVIGATION_DELAY)
        } else {
            ClickOutcome::FollowDefault
        }
    }
}
