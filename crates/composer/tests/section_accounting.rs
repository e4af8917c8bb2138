use proptest::prelude::*;
use share_composer::{ChooserConfig, SectionComposer, ACTION_SEND};
use share_protocol::{
    AppTarget, CallerTarget, DestinationHandle, Section, ServiceCandidate, SourceType,
    TargetIntent,
};

fn build(
    budget: i32,
    callers: usize,
    apps: usize,
    suggestions: usize,
    send: bool,
    finalize: bool,
) -> SectionComposer {
    let config = ChooserConfig {
        max_ranked_targets: budget,
        ..ChooserConfig::default()
    };
    let action = if send { ACTION_SEND } else { "android.intent.action.VIEW" };
    let mut composer = SectionComposer::new(config, TargetIntent::new(action));

    composer.set_caller_targets(
        (0..callers)
            .map(|i| CallerTarget::new(format!("Caller {i}"), DestinationHandle::new("com.host/.X")))
            .collect(),
    );
    composer.set_resolved_apps(
        (0..apps)
            .map(|i| AppTarget::new(format!("com.app{i}/.Main"), format!("App {i}"), i as f32))
            .collect(),
    );
    for i in 0..suggestions {
        composer.add_service_results(
            None,
            vec![ServiceCandidate::new(
                format!("Contact {i}"),
                1.0 / (i + 1) as f32,
                DestinationHandle::new("com.chat/.Share"),
            )],
            SourceType::Caller,
        );
    }
    if finalize {
        composer.complete_service_target_loading();
    }
    composer
}

proptest! {
    #[test]
    fn every_position_below_count_resolves(
        budget in -3i32..12,
        callers in 0usize..8,
        apps in 0usize..20,
        suggestions in 0usize..12,
        send in any::<bool>(),
        finalize in any::<bool>(),
    ) {
        let composer = build(budget, callers, apps, suggestions, send, finalize);
        let counts = composer.counts();
        prop_assert_eq!(composer.count(), counts.total());
        prop_assert!(counts.caller <= 4);
        prop_assert!(counts.service <= 8);

        let mut seen = [0usize; 4];
        for pos in 0..composer.count() {
            let (section, local) = composer.resolve_position(pos).expect("position resolves");
            prop_assert_eq!(composer.section_type_of(pos), Some(section));
            prop_assert!(local < counts.get(section));
            prop_assert!(composer.item_at(pos).is_some());
            seen[section as usize] += 1;
        }
        for section in Section::ORDER {
            prop_assert_eq!(seen[section as usize], counts.get(section));
        }

        for pos in composer.count()..composer.count() + 5 {
            prop_assert_eq!(composer.resolve_position(pos), None);
            prop_assert_eq!(composer.section_type_of(pos), None);
            prop_assert!(composer.item_at(pos).is_none());
        }
    }

    #[test]
    fn sections_stay_in_display_order(
        budget in 0i32..8,
        callers in 0usize..6,
        apps in 0usize..12,
        send in any::<bool>(),
    ) {
        let composer = build(budget, callers, apps, 3, send, false);
        let sections: Vec<Section> = (0..composer.count())
            .filter_map(|pos| composer.section_type_of(pos))
            .collect();
        prop_assert!(sections.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
