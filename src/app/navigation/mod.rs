mod spawn;

use log::{debug, info, warn};

use super::scene::{MainKey, Mode, Node, NodeKind, RESUME_TIMER, SceneState};
use crate::content::{ContentError, ContentPayload, ContentQuery};

/// What to build once the content for a transition arrives.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) enum SpawnPlan {
    Children {
        key: MainKey,
    },
    Grandchildren {
        category_index: usize,
        category: String,
    },
    ProjectContent {
        project_index: usize,
        category: String,
        slug: String,
    },
    About {
        main_index: usize,
    },
}

/// A content request issued by a transition, tagged with the scene
/// generation that issued it.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct PendingLoad {
    pub(in crate::app) generation: u64,
    pub(in crate::app) plan: SpawnPlan,
}

impl PendingLoad {
    pub(in crate::app) fn query(&self) -> ContentQuery {
        match &self.plan {
            SpawnPlan::Children {
                key: MainKey::Contacts,
            } => ContentQuery::Contacts,
            SpawnPlan::Children { .. } => ContentQuery::Categories,
            SpawnPlan::Grandchildren { category, .. } => {
                ContentQuery::ProjectsByCategory(category.clone())
            }
            SpawnPlan::ProjectContent { category, slug, .. } => ContentQuery::Project {
                category: category.clone(),
                slug: slug.clone(),
            },
            SpawnPlan::About { .. } => ContentQuery::About,
        }
    }
}

fn issue(scene: &mut SceneState, plan: SpawnPlan) -> PendingLoad {
    scene.generation += 1;
    PendingLoad {
        generation: scene.generation,
        plan,
    }
}

fn is_content(node: &Node) -> bool {
    matches!(node.kind, NodeKind::Media { .. } | NodeKind::Description(_))
}

/// Enters focus on a top-level entry, or collapses to home when it is
/// already the focused one.
pub(in crate::app) fn enter_focus(scene: &mut SceneState, key: MainKey) -> Option<PendingLoad> {
    if key == MainKey::About {
        return enter_about(scene, key.index());
    }
    if scene.mode == Mode::Focus && scene.focus_key == Some(key) {
        reset_to_home(scene);
        return None;
    }

    Some(refocus(scene, key))
}

fn refocus(scene: &mut SceneState, key: MainKey) -> PendingLoad {
    info!("focus {}", key.label());
    scene.freeze_where(|node| node.is_main());
    scene.truncate_to_mains();
    scene.mode = Mode::Focus;
    scene.focus_key = Some(key);
    scene.selected_category = None;
    scene.selected_project = None;
    scene.selected_content = None;
    scene.camera.depth_target = 1.0;
    issue(scene, SpawnPlan::Children { key })
}

/// Opens the category under the Child at `index`; re-clicking the open
/// category returns to focus.
pub(in crate::app) fn enter_category(scene: &mut SceneState, index: usize) -> Option<PendingLoad> {
    let (category, id) = match scene.nodes.get(index) {
        Some(node) => match &node.kind {
            NodeKind::Child {
                label_raw,
                parent: Some(MainKey::Projects),
                ..
            } => (label_raw.clone(), node.id),
            _ => return None,
        },
        None => return None,
    };
    if scene.mode == Mode::Category && scene.selected_category == Some(index) {
        return back_to_focus(scene);
    }

    info!("category {category}");

    scene.freeze_where(|node| node.is_main() || matches!(node.kind, NodeKind::Child { .. }));
    scene.remove_where(|node| matches!(node.kind, NodeKind::Grandchild { .. }) || is_content(node));
    let category_index = scene.nodes.iter().position(|node| node.id == id)?;

    scene.mode = Mode::Category;
    scene.focus_key = Some(MainKey::Projects);
    scene.selected_category = Some(category_index);
    scene.selected_project = None;
    scene.camera.depth_target = 2.0;
    Some(issue(
        scene,
        SpawnPlan::Grandchildren {
            category_index,
            category,
        },
    ))
}

/// Opens the project under the Grandchild at `index`; re-clicking the open
/// project returns to its category.
pub(in crate::app) fn enter_project(scene: &mut SceneState, index: usize) -> Option<PendingLoad> {
    let (category, slug, id) = match scene.nodes.get(index) {
        Some(node) => match &node.kind {
            NodeKind::Grandchild { category, slug, .. } => (category.clone(), slug.clone(), node.id),
            _ => return None,
        },
        None => return None,
    };
    if scene.mode == Mode::Project && scene.selected_project == Some(index) {
        return back_to_category(scene);
    }

    info!("project {category}/{slug}");

    scene.freeze_where(|_| true);
    scene.remove_where(is_content);
    let project_index = scene.nodes.iter().position(|node| node.id == id)?;

    scene.mode = Mode::Project;
    scene.selected_project = Some(project_index);
    scene.camera.depth_target = 3.0;
    Some(issue(
        scene,
        SpawnPlan::ProjectContent {
            project_index,
            category,
            slug,
        },
    ))
}

/// Shows the about text for the Main at `main_index`, or collapses to home
/// when it is already open.
pub(in crate::app) fn enter_about(scene: &mut SceneState, main_index: usize) -> Option<PendingLoad> {
    if scene.mode == Mode::Content && scene.selected_content == Some(main_index) {
        reset_to_home(scene);
        return None;
    }

    info!("about");
    scene.freeze_where(|node| node.is_main());
    scene.truncate_to_mains();
    scene.mode = Mode::Content;
    scene.focus_key = Some(MainKey::About);
    scene.selected_category = None;
    scene.selected_project = None;
    scene.selected_content = Some(main_index);
    scene.camera.depth_target = 1.0;
    Some(issue(scene, SpawnPlan::About { main_index }))
}

/// Drops every non-main node and snaps the camera back immediately.
pub(in crate::app) fn reset_to_home(scene: &mut SceneState) {
    info!("home");
    scene.truncate_to_mains();
    scene.mode = Mode::Home;
    scene.focus_key = None;
    scene.selected_category = None;
    scene.selected_project = None;
    scene.selected_content = None;
    scene.hovered = None;
    scene.drag = None;
    scene.camera.snap_home();
    scene.rearm_where(RESUME_TIMER, |node| node.is_main());
    scene.generation += 1;
}

pub(in crate::app) fn back_to_category(scene: &mut SceneState) -> Option<PendingLoad> {
    if scene.selected_category.is_none() {
        return back_to_focus(scene);
    }

    info!("back to category");
    scene.remove_where(is_content);
    scene.mode = Mode::Category;
    scene.selected_project = None;
    scene.camera.depth_target = 2.0;
    scene.rearm_where(RESUME_TIMER, |node| {
        matches!(node.kind, NodeKind::Grandchild { .. })
    });
    scene.generation += 1;
    None
}

/// Re-enters focus on the focused entry; its children come back through a
/// fresh fetch.
pub(in crate::app) fn back_to_focus(scene: &mut SceneState) -> Option<PendingLoad> {
    match scene.focus_key {
        Some(key) if key != MainKey::About => Some(refocus(scene, key)),
        _ => {
            reset_to_home(scene);
            None
        }
    }
}

/// Steps one level back up the hierarchy.
pub(in crate::app) fn click_empty(scene: &mut SceneState) -> Option<PendingLoad> {
    match scene.mode {
        Mode::Home => None,
        Mode::Focus | Mode::Content => {
            reset_to_home(scene);
            None
        }
        Mode::Category => back_to_focus(scene),
        Mode::Project => back_to_category(scene),
    }
}

fn plan_fits(scene: &SceneState, plan: &SpawnPlan) -> bool {
    match plan {
        SpawnPlan::Children { key } => {
            scene.mode == Mode::Focus && scene.focus_key == Some(*key)
        }
        SpawnPlan::Grandchildren { category_index, .. } => {
            scene.mode == Mode::Category && scene.selected_category == Some(*category_index)
        }
        SpawnPlan::ProjectContent { project_index, .. } => {
            scene.mode == Mode::Project && scene.selected_project == Some(*project_index)
        }
        SpawnPlan::About { main_index } => {
            scene.mode == Mode::Content && scene.selected_content == Some(*main_index)
        }
    }
}

/// Applies a content reply. Replies for a superseded transition, or for a
/// mode the scene has since left, are dropped.
pub(in crate::app) fn complete(
    scene: &mut SceneState,
    pending: PendingLoad,
    result: Result<ContentPayload, ContentError>,
) {
    if pending.generation != scene.generation || !plan_fits(scene, &pending.plan) {
        debug!(
            "dropping stale reply for {:?} (generation {} vs {})",
            pending.plan, pending.generation, scene.generation
        );
        return;
    }

    let payload = match result {
        Ok(payload) => payload,
        Err(error) => {
            warn!("content for {:?} unavailable: {error}", pending.plan);
            if let SpawnPlan::About { main_index } = pending.plan {
                spawn::spawn_placeholder(scene, main_index);
            }
            return;
        }
    };

    match (pending.plan, payload) {
        (SpawnPlan::Children { .. }, ContentPayload::Categories(categories)) => {
            spawn::spawn_categories(scene, &categories);
        }
        (SpawnPlan::Children { .. }, ContentPayload::Contacts(contacts)) => {
            spawn::spawn_contacts(scene, &contacts);
        }
        (
            SpawnPlan::Grandchildren {
                category_index,
                category,
            },
            ContentPayload::Projects(projects),
        ) => spawn::spawn_grandchildren(scene, category_index, &category, &projects),
        (SpawnPlan::ProjectContent { project_index, .. }, ContentPayload::Project(Some(project))) => {
            spawn::spawn_project_content(scene, project_index, &project);
        }
        (SpawnPlan::ProjectContent { category, slug, .. }, ContentPayload::Project(None)) => {
            warn!("project {category}/{slug} not found");
        }
        (SpawnPlan::About { main_index }, ContentPayload::About(about)) => {
            spawn::spawn_about(scene, main_index, &about);
        }
        (plan, _) => warn!("reply does not match {plan:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::scene::tests::test_scene;
    use crate::content::{AboutRecord, MediaRecord, ProjectRecord};

    fn categories() -> ContentPayload {
        ContentPayload::Categories(vec![
            "visuals".to_owned(),
            "algolab".to_owned(),
            "installations".to_owned(),
        ])
    }

    fn project(media: usize) -> ProjectRecord {
        let record = MediaRecord {
            kind: Some(crate::content::MediaKind::Image),
            src: "a.png".to_owned(),
            alt: String::new(),
            width: None,
            height: None,
        };
        ProjectRecord {
            title: "Drift".to_owned(),
            slug: "drift".to_owned(),
            category: "visuals".to_owned(),
            description: Default::default(),
            media: vec![record; media],
        }
    }

    fn count(scene: &SceneState, predicate: impl Fn(&NodeKind) -> bool) -> usize {
        scene.count_where(|node| predicate(&node.kind))
    }

    fn is_child(kind: &NodeKind) -> bool {
        matches!(kind, NodeKind::Child { .. })
    }

    fn is_grandchild(kind: &NodeKind) -> bool {
        matches!(kind, NodeKind::Grandchild { .. })
    }

    fn focus_projects(scene: &mut SceneState) {
        let pending = enter_focus(scene, MainKey::Projects).unwrap();
        assert_eq!(pending.query(), ContentQuery::Categories);
        complete(scene, pending, Ok(categories()));
    }

    fn open_category(scene: &mut SceneState) -> usize {
        focus_projects(scene);
        let pending = enter_category(scene, 3).unwrap();
        assert_eq!(
            pending.query(),
            ContentQuery::ProjectsByCategory("visuals".to_owned())
        );
        complete(
            scene,
            pending,
            Ok(ContentPayload::Projects(vec![project(2), project(0)])),
        );
        3
    }

    fn open_project(scene: &mut SceneState, media: usize) -> usize {
        open_category(scene);
        let project_index = scene
            .nodes
            .iter()
            .position(|node| is_grandchild(&node.kind))
            .unwrap();
        let pending = enter_project(scene, project_index).unwrap();
        complete(scene, pending, Ok(ContentPayload::Project(Some(project(media)))));
        project_index
    }

    #[test]
    fn focus_then_refocus_returns_home() {
        let mut scene = test_scene();
        focus_projects(&mut scene);

        assert_eq!(scene.mode, Mode::Focus);
        assert_eq!(scene.camera.depth_target, 1.0);
        assert_eq!(count(&scene, is_child), 3);
        assert!(scene.nodes[..3].iter().all(|node| node.is_frozen()));

        scene.camera.depth = 0.8;
        scene.camera.offset_x = -20.0;
        assert!(enter_focus(&mut scene, MainKey::Projects).is_none());

        assert_eq!(scene.mode, Mode::Home);
        assert_eq!(scene.nodes.len(), 3);
        assert_eq!(scene.camera.depth, 0.0);
        assert_eq!(scene.camera.offset_x, 0.0);
        assert!(scene.nodes.iter().all(|node| !node.is_frozen()));
    }

    #[test]
    fn category_click_toggles_back_to_focus() {
        let mut scene = test_scene();
        let category = open_category(&mut scene);
        assert_eq!(scene.mode, Mode::Category);
        assert_eq!(scene.selected_category, Some(category));
        assert_eq!(count(&scene, is_grandchild), 2);

        let pending = enter_category(&mut scene, category).unwrap();
        assert_eq!(scene.mode, Mode::Focus);
        assert_eq!(count(&scene, is_grandchild), 0);
        assert_eq!(count(&scene, is_child), 0);

        complete(&mut scene, pending, Ok(categories()));
        assert_eq!(count(&scene, is_child), 3);
    }

    #[test]
    fn empty_click_in_category_respawns_children() {
        let mut scene = test_scene();
        open_category(&mut scene);

        let pending = click_empty(&mut scene).unwrap();
        assert_eq!(scene.mode, Mode::Focus);
        assert_eq!(count(&scene, is_grandchild), 0);
        complete(&mut scene, pending, Ok(categories()));

        assert_eq!(count(&scene, is_child), 3);
        assert_eq!(scene.camera.depth_target, 1.0);
    }

    #[test]
    fn project_without_media_spawns_only_a_description() {
        let mut scene = test_scene();
        open_project(&mut scene, 0);

        assert_eq!(scene.mode, Mode::Project);
        assert_eq!(count(&scene, |kind| matches!(kind, NodeKind::Description(_))), 1);
        assert_eq!(count(&scene, |kind| matches!(kind, NodeKind::Media { .. })), 0);
    }

    #[test]
    fn six_media_scale_inside_the_configured_range() {
        let mut scene = test_scene();
        let project_index = open_project(&mut scene, 6);
        let media = scene.config.media;

        let scales: Vec<(f32, i32, Option<usize>)> = scene
            .nodes
            .iter()
            .filter_map(|node| match &node.kind {
                NodeKind::Media {
                    scale,
                    z_index,
                    project_index,
                    ..
                } => Some((*scale, *z_index, *project_index)),
                _ => None,
            })
            .collect();

        assert_eq!(scales.len(), 6);
        for (scale, z_index, owner) in scales {
            assert!(scale >= media.scale_min && scale <= media.scale_max);
            assert!((0..1000).contains(&z_index));
            assert_eq!(owner, Some(project_index));
        }
    }

    #[test]
    fn project_click_toggles_back_to_category() {
        let mut scene = test_scene();
        let project_index = open_project(&mut scene, 2);

        assert!(enter_project(&mut scene, project_index).is_none());

        assert_eq!(scene.mode, Mode::Category);
        assert_eq!(scene.selected_project, None);
        assert_eq!(scene.camera.depth_target, 2.0);
        assert_eq!(scene.released_media.len(), 2);
        assert_eq!(count(&scene, is_grandchild), 2);
        assert!(
            scene
                .nodes
                .iter()
                .filter(|node| is_grandchild(&node.kind))
                .all(|node| !node.is_frozen())
        );
    }

    #[test]
    fn about_toggles_and_spawns_a_frozen_box() {
        let mut scene = test_scene();
        let pending = enter_focus(&mut scene, MainKey::About).unwrap();
        assert_eq!(pending.query(), ContentQuery::About);
        complete(
            &mut scene,
            pending,
            Ok(ContentPayload::About(AboutRecord {
                text: "hello".to_owned(),
            })),
        );

        assert_eq!(scene.mode, Mode::Content);
        let about = scene.nodes.last().unwrap();
        assert!(matches!(about.kind, NodeKind::AboutDescription(_)));
        assert!(about.is_frozen());

        assert!(enter_about(&mut scene, 0).is_none());
        assert_eq!(scene.mode, Mode::Home);
        assert_eq!(scene.nodes.len(), 3);
    }

    #[test]
    fn stale_replies_are_dropped() {
        let mut scene = test_scene();
        let stale = enter_focus(&mut scene, MainKey::Projects).unwrap();
        let fresh = enter_focus(&mut scene, MainKey::Contacts).unwrap();
        assert_eq!(fresh.query(), ContentQuery::Contacts);

        complete(&mut scene, stale, Ok(categories()));
        assert_eq!(count(&scene, is_child), 0);

        complete(&mut scene, fresh, Ok(ContentPayload::Contacts(Vec::new())));
        assert_eq!(scene.focus_key, Some(MainKey::Contacts));
    }

    #[test]
    fn failed_about_load_shows_placeholder_text() {
        let mut scene = test_scene();
        let pending = enter_about(&mut scene, 0).unwrap();

        complete(&mut scene, pending, Err(ContentError::WorkerGone));

        assert_eq!(count(&scene, |kind| matches!(kind, NodeKind::TextContent(_))), 1);
    }

    #[test]
    fn failed_loads_leave_the_scene_untouched() {
        let mut scene = test_scene();
        let pending = enter_focus(&mut scene, MainKey::Contacts).unwrap();

        complete(&mut scene, pending, Err(ContentError::WorkerGone));

        assert_eq!(scene.mode, Mode::Focus);
        assert_eq!(scene.nodes.len(), 3);
    }
}
