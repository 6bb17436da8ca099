use record_filter::config::load_builtin_catalog;
use record_filter::filter::{CachedFilter, FilterRule, NumberOperator, Operator};
use record_filter::{FilterConsumer, FilterSession, RuleUpdate};
use serde_json::{Value, json};
use std::sync::Arc;

/// Mirrors a list screen: owns the records and re-filters on every change
struct ListScreen {
    records: Vec<Value>,
    revision: u64,
    search_fields: Vec<String>,
    rules: Vec<FilterRule>,
    search_term: String,
    cache: CachedFilter,
}

impl ListScreen {
    fn new(records: Vec<Value>, search_fields: Vec<String>) -> Self {
        Self {
            records,
            revision: 1,
            search_fields,
            rules: Vec::new(),
            search_term: String::new(),
            cache: CachedFilter::new(),
        }
    }

    fn visible_names(&mut self) -> Vec<String> {
        let criteria = record_filter::filter::FilterCriteria {
            rules: self.rules.clone(),
            search_term: self.search_term.clone(),
            search_fields: self.search_fields.clone(),
        };
        self.cache
            .filter(&self.records, self.revision, &criteria)
            .iter()
            .filter_map(|r| r["name"].as_str().map(str::to_string))
            .collect()
    }
}

impl FilterConsumer for ListScreen {
    fn on_filters_changed(&mut self, rules: &[FilterRule]) {
        self.rules = rules.to_vec();
    }

    fn on_search_changed(&mut self, search_term: &str) {
        self.search_term = search_term.to_string();
    }
}

fn classes() -> Vec<Value> {
    vec![
        json!({"name": "Grade 9 A", "class_level": "class_9", "capacity": 35, "is_active": "true"}),
        json!({"name": "Grade 9 B", "class_level": "class_9", "capacity": 50, "is_active": "false"}),
        json!({"name": "Grade 10 A", "class_level": "class_10", "capacity": 45, "is_active": "true"}),
    ]
}

fn session() -> (FilterSession, Vec<String>) {
    let catalog = load_builtin_catalog("classes")
        .expect("builtin catalog should parse")
        .expect("classes catalog");
    let search_fields = catalog.search_fields.clone();
    (
        FilterSession::new(Arc::new(catalog.field_catalog())),
        search_fields,
    )
}

#[test]
fn test_editing_session_drives_list_screen() {
    let (session, search_fields) = session();
    let mut screen = ListScreen::new(classes(), search_fields);
    assert_eq!(screen.visible_names().len(), 3);

    let session = session
        .with_rule_added()
        .with_rule_updated(0, RuleUpdate::Field("capacity".into()))
        .with_rule_updated(
            0,
            RuleUpdate::Operator(Operator::Number(NumberOperator::Greater)),
        );

    // no value yet: nothing changes
    session.apply(&mut screen);
    assert_eq!(screen.visible_names().len(), 3);

    let session = session.with_rule_updated(0, RuleUpdate::Value("40".into()));
    session.apply(&mut screen);
    assert_eq!(screen.visible_names(), vec!["Grade 9 B", "Grade 10 A"]);

    let session = session
        .with_rule_added()
        .with_rule_updated(1, RuleUpdate::Field("is_active".into()))
        .with_rule_updated(1, RuleUpdate::Value("true".into()));
    session.apply(&mut screen);
    assert_eq!(screen.visible_names(), vec!["Grade 10 A"]);

    // removal re-publishes on its own
    let session = session.remove_rule(0, &mut screen);
    assert_eq!(screen.visible_names(), vec!["Grade 9 A", "Grade 10 A"]);

    let session = session.remove_rule(0, &mut screen);
    assert!(session.rules().is_empty());
    assert_eq!(screen.visible_names().len(), 3);

    let cleared = session.with_search_term("grade").clear(&mut screen);
    assert_eq!(cleared.active_rule_count(), 0);
    assert_eq!(screen.visible_names().len(), 3);
}

#[test]
fn test_session_search_flows_into_criteria() {
    let (session, search_fields) = session();
    let session = session.with_search_term("10");
    let criteria = session.criteria(search_fields);

    let records = classes();
    let matched = criteria.filter(&records);
    assert_eq!(matched, vec![&records[2]]);
}

#[test]
fn test_older_session_values_stay_usable_for_undo() {
    let (session, _) = session();
    let v1 = session.with_rule_added();
    let v2 = v1.with_rule_updated(0, RuleUpdate::Value("Grade".into()));
    let v3 = v2.with_rule_removed(0);

    assert_eq!(v1.rules().len(), 1);
    assert_eq!(v2.active_rule_count(), 1);
    assert!(v3.rules().is_empty());
    assert_eq!(v2.rules()[0].value, "Grade");
}

#[test]
fn test_cache_only_recomputes_on_change() {
    let (_, search_fields) = session();
    let mut screen = ListScreen::new(classes(), search_fields);

    screen.visible_names();
    screen.visible_names();
    assert_eq!(screen.cache.recomputations(), 1);

    screen.search_term = "9".into();
    screen.visible_names();
    assert_eq!(screen.cache.recomputations(), 2);

    screen.records.push(json!({"name": "Grade 9 C", "capacity": 20}));
    screen.revision += 1;
    assert_eq!(
        screen.visible_names(),
        vec!["Grade 9 A", "Grade 9 B", "Grade 9 C"]
    );
    assert_eq!(screen.cache.recomputations(), 3);
}
