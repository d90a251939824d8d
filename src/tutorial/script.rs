//! Tutorial scripts: typed steps parsed from `TutorialScriptDef`.

use bevy::prelude::*;

use crate::shared::*;

/// Default duration of a move, in seconds.
pub const DEFAULT_MOVE_SECS: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum MoveTarget {
    /// Screen position, origin bottom-left.
    Absolute(Vec2),
    /// Offset from the position of a named UI element.
    Anchor { name: String, offset: Vec2 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Press the finger down for a moment.
    Click,
    /// Start the current list over, unless it was aborted.
    Reset,
    Show,
    Hide,
    InstantShow,
    InstantHide,
    SetPosition(Vec2),
    MoveTo { target: MoveTarget, duration: f32 },
}

impl TryFrom<&StepDef> for Step {
    type Error = GardenError;

    fn try_from(def: &StepDef) -> Result<Self, Self::Error> {
        let step = match def.action.as_str() {
            "click" => Step::Click,
            "reset" => Step::Reset,
            "show" => Step::Show,
            "hide" => Step::Hide,
            "instant_show" => Step::InstantShow,
            "instant_hide" => Step::InstantHide,
            "set_position" => Step::SetPosition(Vec2::new(
                def.x.unwrap_or_default(),
                def.y.unwrap_or_default(),
            )),
            "move" => {
                let target = match &def.anchor {
                    Some(name) => MoveTarget::Anchor {
                        name: name.clone(),
                        offset: Vec2::new(def.x.unwrap_or_default(), def.y.unwrap_or_default()),
                    },
                    None => match (def.x, def.y) {
                        (Some(x), Some(y)) => MoveTarget::Absolute(Vec2::new(x, y)),
                        _ => {
                            return Err(GardenError::UnrecognizedStep(
                                "move without an anchor needs both x and y".to_string(),
                            ))
                        }
                    },
                };
                Step::MoveTo {
                    target,
                    duration: def.duration.unwrap_or(DEFAULT_MOVE_SECS),
                }
            }
            other => return Err(GardenError::UnrecognizedStep(other.to_string())),
        };
        Ok(step)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TutorialPage {
    pub message: Option<String>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TutorialScript {
    pub pages: Vec<TutorialPage>,
}

impl TryFrom<&TutorialScriptDef> for TutorialScript {
    type Error = GardenError;

    fn try_from(def: &TutorialScriptDef) -> Result<Self, Self::Error> {
        let pages = def
            .pages
            .iter()
            .map(|page| -> Result<TutorialPage, GardenError> {
                Ok(TutorialPage {
                    message: page.message.clone(),
                    steps: page
                        .actions
                        .iter()
                        .map(Step::try_from)
                        .collect::<Result<_, _>>()?,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { pages })
    }
}

impl TutorialScript {
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().filter_map(|page| page.message.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(action: &str) -> StepDef {
        StepDef {
            action: action.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_primitive_steps() {
        assert_eq!(Step::try_from(&def("click")), Ok(Step::Click));
        assert_eq!(Step::try_from(&def("reset")), Ok(Step::Reset));
        assert_eq!(Step::try_from(&def("instant_hide")), Ok(Step::InstantHide));
    }

    #[test]
    fn test_unknown_action_fails_fast() {
        assert_eq!(
            Step::try_from(&def("msg_box_show")),
            Err(GardenError::UnrecognizedStep("msg_box_show".to_string()))
        );
    }

    #[test]
    fn test_move_defaults() {
        let anchored = StepDef {
            action: "move".to_string(),
            anchor: Some("Sun".to_string()),
            y: Some(-65.0),
            ..Default::default()
        };
        assert_eq!(
            Step::try_from(&anchored),
            Ok(Step::MoveTo {
                target: MoveTarget::Anchor {
                    name: "Sun".to_string(),
                    offset: Vec2::new(0.0, -65.0),
                },
                duration: DEFAULT_MOVE_SECS,
            })
        );

        let half = StepDef {
            action: "move".to_string(),
            x: Some(10.0),
            ..Default::default()
        };
        assert!(matches!(Step::try_from(&half), Err(GardenError::UnrecognizedStep(_))));
    }

    #[test]
    fn test_script_from_def_keeps_page_order() {
        let script_def = TutorialScriptDef {
            pages: vec![
                PageDef {
                    message: Some("first".to_string()),
                    actions: vec![def("show"), def("reset")],
                },
                PageDef {
                    message: None,
                    actions: vec![def("instant_hide")],
                },
            ],
        };
        let script = TutorialScript::try_from(&script_def).unwrap();
        assert_eq!(script.pages.len(), 2);
        assert_eq!(script.pages[0].steps, vec![Step::Show, Step::Reset]);
        assert_eq!(script.messages().collect::<Vec<_>>(), vec!["first"]);
    }

    #[test]
    fn test_one_bad_step_rejects_script() {
        let script_def = TutorialScriptDef {
            pages: vec![PageDef {
                message: None,
                actions: vec![def("show"), def("wiggle")],
            }],
        };
        assert!(TutorialScript::try_from(&script_def).is_err());
    }
}
