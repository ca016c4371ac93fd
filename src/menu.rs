use crate::settings::{Settings, DEFAULTS_FILE, SETTINGS_FILE, BUILD, VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Main,
    Details,
    Settings,
    Credits,
    Controls,
}

/// Text content of the in-window help menus. Pure: state in, lines out; the
/// overlay pass decides how they are drawn.
pub fn menu_lines(
    menu: Menu,
    is_open: bool,
    settings: &Settings,
    fps: f64,
    delta: f64,
) -> Vec<String> {
    let mut lines = vec![if is_open {
        "[H] to close".to_string()
    } else {
        "[H] to open".to_string()
    }];
    if !is_open {
        return lines;
    }

    match menu {
        Menu::Main => {
            lines[0] += &format!(" - Black hole simulation [{VERSION} - {BUILD}]");
            lines.push(String::new());
            lines.push("Controls, can be used in any menu".to_string());
            lines.push(" - [C] -> Camera Controls".to_string());
            lines.push(" - [D] -> View details".to_string());
            lines.push(" - [S] -> Settings".to_string());
            lines.push(" - [G] -> Credits".to_string());
            lines.push(" - [B] -> Back (this menu)".to_string());
            lines.push(" - [Backspace] / [Delete] -> Quit".to_string());
        }

        Menu::Details => {
            lines[0] += " - Simulation Details";
            lines.push(format!(
                "{}x{} - {fps:.2}fps - {:.3}ms",
                settings.resolution_x,
                settings.resolution_y,
                delta * 1000.0
            ));
            lines.push(String::new());
            lines.push("Simulation scale:".to_string());
            lines.push("  1r = 1 schwarzschild radius".to_string());
            lines.push(String::new());
            lines.push("Disk radius:".to_string());
            lines.push(format!("  Inner {:.1}r", settings.disk_inner_radius));
            lines.push(format!("  Outer {:.1}r", settings.disk_outer_radius));
            lines.push(String::new());
            let sim_range = settings.disk_outer_radius * 1.25;
            lines.push(format!("Ray simulation range: {sim_range:.2}r"));
            lines.push(format!("Ray step size: {:.1}r", settings.simulation_step_size));
            lines.push(String::new());
            lines.push("[B] Go back".to_string());
        }

        Menu::Settings => {
            lines[0] += " - Settings";
            lines.push(String::new());
            lines.push(format!(
                "To edit the simulation settings, open the generated file \"{SETTINGS_FILE}\""
            ));
            lines.push("next to the executable.".to_string());
            lines.push(String::new());
            lines.push(
                "You can also press [O] to automatically open the settings file in your"
                    .to_string(),
            );
            lines.push("default text editor.".to_string());
            lines.push(format!(
                "Or if you want to access the default values, press [P]. The \"{DEFAULTS_FILE}\""
            ));
            lines.push("file is READ ONLY, changing it will have no effect.".to_string());
            lines.push(String::new());
            lines.push(
                "Once all changes are saved, press [Enter] in this window to apply them."
                    .to_string(),
            );
            lines.push(String::new());
            lines.push("[B] Go back".to_string());
        }

        Menu::Credits => {
            lines[0] += " - Credits - Links inside \"readme.md\"";
            lines.push(String::new());
            lines.push("  \"the magical -3/2 * h2 * r^(-5)\" -> Riccardo Antonelli".to_string());
            lines.push("  Bloom effect for Monogame/XNA -> Kosmonaut3d".to_string());
            lines.push("  Made by Lepsima".to_string());
            lines.push(String::new());
            lines.push("[B] Go back".to_string());
        }

        Menu::Controls => {
            lines[0] += " - Camera Controls";
            lines.push(String::new());
            lines.push("Hold [Left mouse] and drag to orbit around the black hole".to_string());
            lines.push("Hold [Right mouse] and drag to aim the camera freely".to_string());
            lines.push("Hold [Middle mouse] and drag to orbit vertically while aiming".to_string());
            lines.push("Scroll to zoom in and out".to_string());
            lines.push(String::new());
            lines.push("While video_render_mode is enabled:".to_string());
            lines.push("  [1] marks the capture START point".to_string());
            lines.push("  [2] marks the capture END point".to_string());
            lines.push(String::new());
            lines.push("[B] Go back".to_string());
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_menu_shows_only_the_hint() {
        let lines = menu_lines(Menu::Main, false, &Settings::default(), 60.0, 0.016);
        assert_eq!(lines, vec!["[H] to open".to_string()]);
    }

    #[test]
    fn details_menu_embeds_resolution_and_fps() {
        let lines = menu_lines(Menu::Details, true, &Settings::default(), 59.5, 0.0168);
        assert!(lines[1].starts_with("1280x720 - 59.50fps"));
    }

    #[test]
    fn every_open_menu_has_content() {
        for menu in [
            Menu::Main,
            Menu::Details,
            Menu::Settings,
            Menu::Credits,
            Menu::Controls,
        ] {
            let lines = menu_lines(menu, true, &Settings::default(), 60.0, 0.016);
            assert!(lines.len() > 2, "{menu:?} should have body text");
            assert!(lines[0].starts_with("[H] to close"));
        }
    }
}
