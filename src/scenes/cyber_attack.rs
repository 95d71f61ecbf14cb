use crate::animations::{
    Create, FadeIn, FadeOut, Flash, GrowArrow, Recolor, Transform, Uncreate, Write,
};
use crate::core::{
    color::{Color, BLUE, BLUE_E, GRAY, GREEN, ORANGE, RED, YELLOW},
    scene::{Scene, SceneConfig},
    shape::{Group, Mobject},
};
use crate::geometry::{
    axes::Axes,
    point,
    shapes::{Arrow, CurvedArrow, Dot, Line, Rectangle},
    text::{Fonts, Text},
    DOWN, DR, MED_LARGE_BUFF, MED_SMALL_BUFF, RIGHT, TAU, UP,
};
use crate::{lagged_start, play};

pub const BACKGROUND: Color = Color::rgba(30. / 255., 30. / 255., 30. / 255., 1.);

const NODE_RADIUS: f32 = 0.15;

/// A star-shaped defender network is infiltrated through its web node, the
/// attacker moves laterally to the database, an entropy spike raises an
/// alert and a containment playbook cuts the attack paths.
pub fn build(fonts: &Fonts) -> Scene {
    let mut scene = Scene::new(SceneConfig {
        background: BACKGROUND,
    });

    // C1, the defended infrastructure
    let n3_pos = point(0.5, 0.);
    let c1_center = Dot::new(point(2., 0.), NODE_RADIUS, BLUE);
    let c1_satellites = Group::new(
        [
            point(2., 2.),
            point(3.5, 0.5),
            point(3.5, -0.5),
            point(2., -2.),
        ]
        .map(|p| Dot::new(p, NODE_RADIUS, BLUE)),
    );
    let c1_n3 = Dot::new(n3_pos, NODE_RADIUS, BLUE);
    let c1_group = Group::new([c1_center.clone(), c1_satellites.clone(), c1_n3.clone()]);

    let lbl_c1 = Text::builder("C1: Target Infrastructure")
        .font_size(20.)
        .color(BLUE)
        .build(fonts);
    lbl_c1.next_to(&c1_center, UP, 2.5);
    let lbl_n1 = Text::builder("DB (n1)").font_size(14.).build(fonts);
    lbl_n1.next_to(&c1_center, RIGHT, MED_SMALL_BUFF);
    let lbl_n3 = Text::builder("Web (n3)").font_size(14.).build(fonts);
    lbl_n3.next_to(&c1_n3, DOWN, MED_SMALL_BUFF);

    let hub = c1_center.center();
    let edges_c1 = Group::new(
        c1_satellites
            .leaves()
            .iter()
            .chain([&c1_n3])
            .map(|node| Line::new(hub, node.center(), 2., BLUE_E))
            .collect::<Vec<Mobject>>(),
    );

    // C2, the attackers
    let c2_group = Group::new(
        [point(-5., 1.), point(-5., 0.), point(-5., -1.)]
            .map(|p| Dot::new(p, NODE_RADIUS, RED)),
    );
    let lbl_c2 = Text::builder("C2: Attacker")
        .font_size(20.)
        .color(RED)
        .build(fonts);
    lbl_c2.next_to(&c2_group, UP, 1.);

    // setup
    play!(scene, FadeIn::new(lbl_c1), FadeIn::new(lbl_c2));
    play!(
        scene,
        lagged_start!(0.1;
            Create::new(c1_group),
            Create::new(edges_c1),
            Create::new(c2_group),
            Write::new(lbl_n1),
            Write::new(lbl_n3),
        )
    );
    scene.wait(1.);

    // infiltration through the web node
    let attack_arrow = Arrow::new(point(-5., 0.), n3_pos, RED, 0.2);
    let alert_text_1 = Text::builder("Phase 1: Infiltration (WebShell)")
        .font_size(24.)
        .color(RED)
        .build(fonts);
    alert_text_1.to_edge(UP, MED_LARGE_BUFF);

    play!(scene, Write::new(alert_text_1.clone()));
    play!(scene, GrowArrow::new(attack_arrow.clone()));
    play!(scene, Flash::new(c1_n3.clone(), RED, 0.5));
    play!(scene, Recolor::new(c1_n3.clone(), ORANGE));
    scene.wait(1.);

    // lateral movement to the database
    let lat_mov_arrow = CurvedArrow::new(n3_pos, point(2., 0.), -TAU / 4., ORANGE);
    let alert_text_2 = Text::builder("Phase 2: Lateral Movement to DB")
        .font_size(24.)
        .color(ORANGE)
        .build(fonts);
    alert_text_2.to_edge(UP, MED_LARGE_BUFF);

    play!(scene, Transform::new(alert_text_1.clone(), alert_text_2));
    play!(scene, Create::new(lat_mov_arrow.clone()));
    play!(scene, Recolor::new(c1_center.clone(), ORANGE));
    scene.wait(1.);

    // entropy spike
    let axes = Axes::new([0., 5., 1.], [0., 10., 5.], 2., 1.5);
    axes.to_corner(DR, MED_LARGE_BUFF);
    let graph_label = Text::builder("Entropy E(t)").font_size(18.).build(fonts);
    graph_label.next_to(axes.mobject(), UP, MED_SMALL_BUFF);
    let curve = axes.plot(|x| if x < 2.5 { 0.5 } else { 8. }, YELLOW);

    play!(
        scene,
        Create::new(axes.mobject().clone()),
        Write::new(graph_label)
    );
    play!(scene, Create::new(curve).run_time(2.));

    let alert_box = Rectangle::new(4., 1., RED, 0.8);
    alert_box.move_to(point(0., 2.5));
    let alert_msg = Text::builder("ANOMALY DETECTED!")
        .font_size(30.)
        .bold()
        .build(fonts);
    alert_msg.move_to_mobject(&alert_box);

    play!(
        scene,
        FadeIn::new(alert_box.clone()),
        Write::new(alert_msg.clone())
    );
    scene.wait(1.);

    // containment playbook
    let resp_text = Text::builder("Phase 3: Playbook Containment")
        .font_size(24.)
        .color(GREEN)
        .build(fonts);
    resp_text.to_edge(UP, MED_LARGE_BUFF);

    play!(scene, Transform::new(alert_text_1, resp_text));
    play!(scene, FadeOut::new(alert_box), FadeOut::new(alert_msg));
    play!(
        scene,
        Uncreate::new(attack_arrow),
        Uncreate::new(lat_mov_arrow),
        Recolor::new(c1_n3, GRAY),
        Recolor::new(c1_center.clone(), BLUE),
    );
    play!(scene, Flash::new(c1_center, GREEN, 0.5));

    let final_text = Text::builder("System Secured")
        .font_size(30.)
        .color(GREEN)
        .build(fonts);
    final_text.move_to(point(0., -3.));
    play!(scene, Write::new(final_text));

    scene.wait(3.);
    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::{Player, Segment};

    fn scene() -> Option<Scene> {
        match Fonts::discover() {
            Ok(fonts) => Some(build(&fonts)),
            Err(e) => {
                eprintln!("skipping: {e}");
                None
            }
        }
    }

    #[test]
    fn timeline_matches_the_script() {
        let Some(scene) = scene() else { return };
        assert_eq!(scene.segments().len(), 22);
        assert!((scene.duration() - 27.4).abs() < 1e-4);
        assert_eq!(scene.background(), BACKGROUND);

        let waits: Vec<f32> = scene
            .segments()
            .iter()
            .filter_map(|s| match s {
                Segment::Wait(t) => Some(*t),
                Segment::Play(_) => None,
            })
            .collect();
        assert_eq!(waits, [1., 1., 1., 1., 3.]);
    }

    #[test]
    fn playback_ends_contained() {
        let Some(scene) = scene() else { return };
        let mut player = Player::new(scene);
        player.finish();
        assert!(player.is_finished());

        let stage = player.stage();
        // labels, groups, alert text, axes, graph label, curve, final text
        assert_eq!(stage.mobjects().len(), 12);

        let leaves = stage.draw_order();
        let names: Vec<&str> = leaves.iter().map(|m| m.borrow().name).collect();
        for removed in ["Arrow", "CurvedArrow", "ArrowTip", "Rectangle"] {
            assert!(!names.contains(&removed), "{removed} still on stage");
        }

        let dot_fills: Vec<Color> = leaves
            .iter()
            .filter(|m| m.borrow().name == "Dot")
            .map(|m| m.borrow().style().fill_color)
            .collect();
        assert_eq!(dot_fills.len(), 4 + 2 + 3);
        assert_eq!(dot_fills.iter().filter(|c| **c == GRAY).count(), 1);
        assert_eq!(dot_fills.iter().filter(|c| **c == RED).count(), 3);
        assert!(!dot_fills.contains(&ORANGE));
    }
}
