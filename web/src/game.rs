use crate::leaderboard::{self, LeaderboardPanel, SubmitFlow};
use crate::utils::*;
use bitflags::bitflags;
use clap::Args;
use gloo::events::EventListener;
use gloo::timers::callback::{Interval, Timeout};
use minesweeper_core::{
    CellView, ChordGesture, Clock, Coord, Coord2, EngineState, GameSession, GestureAction, MarkOutcome, MouseButton,
    RevealOutcome, Tier, format_elapsed, format_mines_left, is_adjacent_or_same,
};
use minesweeper_protocol::MAX_USERNAME_CHARS;
use serde::{Deserialize, Serialize};
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Hold time before a touch counts as a long press and flags instead of revealing.
const LONG_PRESS_MS: u32 = 500;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq)]
    pub(crate) struct MouseButtons: u16 {
        const LEFT    = 1;
        const RIGHT   = 1 << 1;
    }
}

fn event_button(e: &MouseEvent) -> Option<MouseButton> {
    match e.button() {
        0 => Some(MouseButton::Left),
        2 => Some(MouseButton::Right),
        _ => None,
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
struct Preferences {
    tier: Tier,
    username: String,
}

impl StorageKey for Preferences {
    const KEY: &'static str = "minesweeper:prefs";
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum CellMsg {
    Press(MouseButton, Coord2),
    Release(MouseButton, Coord2),
    Enter(Coord2, MouseButtons),
    TouchStart(Coord2),
    TouchEnd,
    TouchMove,
}

#[derive(Debug)]
pub(crate) enum Msg {
    Cell(CellMsg),
    LeaveBoard,
    ReleaseOutside,
    LongPress(Coord2),
    UpdateTime,
    NewGame,
    SelectTier(Tier),
    UsernameInput(String),
    SubmitScore,
    SubmitDone(u32, Result<SubmitFlow, String>),
    CloseDialog,
}

#[derive(Clone, Debug, PartialEq)]
enum Dialog {
    Lost,
    Won { time: u32 },
    Submitting,
    Notice { title: String, body: String },
}

fn finish_dialog<C: Clock>(session: &GameSession<C>) -> Option<Dialog> {
    match session.state() {
        EngineState::Lost => Some(Dialog::Lost),
        EngineState::Won => session.winning_time().map(|time| Dialog::Won {
            time: u32::try_from(time).unwrap_or(u32::MAX),
        }),
        EngineState::Ready | EngineState::Playing => None,
    }
}

/// Cuts typed names to the length the service accepts, counted in code points.
fn clamp_username(input: &str) -> String {
    input.chars().take(MAX_USERNAME_CHARS).collect()
}

fn face_class(state: EngineState, gesture: &ChordGesture) -> &'static str {
    match state {
        EngineState::Won => "win",
        EngineState::Lost => "lose",
        _ if gesture.pressed_cell().is_some() || gesture.chord_anchor().is_some() => "mid-open",
        EngineState::Ready => "not-started",
        EngineState::Playing => "in-progress",
    }
}

fn cell_class(view: CellView, pressed: bool) -> Classes {
    let mut class = classes!(
        "cell",
        match view {
            CellView::Hidden => classes!(),
            CellView::Flagged => classes!("flag"),
            CellView::Revealed(count) => classes!("open", format!("num-{}", count)),
            CellView::Mine => classes!("open", "mine"),
            CellView::TriggeredMine => classes!("open", "mine", "oops"),
        }
    );
    if pressed {
        class.push("open");
    }
    class
}

#[derive(Properties, Clone, PartialEq)]
struct CellProps {
    x: Coord,
    y: Coord,
    view: CellView,
    #[prop_or_default]
    pressed: bool,
    callback: Callback<CellMsg>,
}

#[function_component(BoardCell)]
fn board_cell(props: &CellProps) -> Html {
    let CellProps {
        x,
        y,
        view,
        pressed,
        callback,
    } = props.clone();
    let pos = (x, y);
    let class = cell_class(view, pressed);

    let onmousedown = {
        let callback = callback.clone();
        Callback::from(move |e: MouseEvent| {
            if let Some(button) = event_button(&e) {
                log::trace!("{:?} mouse down {:?}", pos, button);
                callback.emit(CellMsg::Press(button, pos));
            }
        })
    };

    let onmouseup = {
        let callback = callback.clone();
        Callback::from(move |e: MouseEvent| {
            // releases that do not reach the window listener happened on the board
            e.stop_propagation();
            if let Some(button) = event_button(&e) {
                log::trace!("{:?} mouse up {:?}", pos, button);
                callback.emit(CellMsg::Release(button, pos));
            }
        })
    };

    let onmouseenter = {
        let callback = callback.clone();
        Callback::from(move |e: MouseEvent| {
            let buttons = MouseButtons::from_bits_truncate(e.buttons());
            callback.emit(CellMsg::Enter(pos, buttons));
        })
    };

    let ontouchstart = {
        let callback = callback.clone();
        Callback::from(move |_: TouchEvent| callback.emit(CellMsg::TouchStart(pos)))
    };

    let ontouchend = {
        let callback = callback.clone();
        Callback::from(move |e: TouchEvent| {
            // keep the browser from replaying the touch as mouse events
            e.prevent_default();
            callback.emit(CellMsg::TouchEnd);
        })
    };

    let ontouchmove = Callback::from(move |_: TouchEvent| callback.emit(CellMsg::TouchMove));

    html! {
        <td {class} {onmousedown} {onmouseup} {onmouseenter} {ontouchstart} {ontouchend} {ontouchmove}/>
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Difficulty to start with instead of the last one played
    #[arg(short, long)]
    tier: Option<Tier>,
}

pub(crate) struct GameView {
    prefs: Preferences,
    fixed_seed: Option<u64>,
    session: GameSession,
    gesture: ChordGesture,
    touch: Option<(Coord2, Timeout)>,
    dialog: Option<Dialog>,
    leaderboard_version: u32,
    prev_time: u64,
    _timer_interval: Interval,
    _release_listener: EventListener,
}

impl GameView {
    fn new_session(&self, tier: Tier) -> GameSession {
        let seed = self.fixed_seed.unwrap_or_else(js_random_seed);
        log::debug!("New {} game, seed {}", tier, seed);
        GameSession::new(tier, seed)
    }

    fn restart(&mut self, tier: Tier) {
        self.session = self.new_session(tier);
        self.gesture = ChordGesture::default();
        self.touch = None;
        self.dialog = None;
        self.prev_time = 0;
    }

    fn apply(&mut self, action: GestureAction) -> bool {
        let result = match action {
            GestureAction::None => return false,
            GestureAction::Reveal(pos) => self.session.reveal(pos).map(RevealOutcome::has_update),
            GestureAction::ToggleFlag(pos) => self.session.toggle_flag(pos).map(MarkOutcome::has_update),
            GestureAction::Chord(pos) => self.session.chord_reveal(pos).map(RevealOutcome::has_update),
        };

        match result {
            Ok(updated) => {
                if updated && self.dialog.is_none() {
                    self.dialog = finish_dialog(&self.session);
                }
                updated
            }
            Err(err) => {
                log::warn!("{:?} rejected: {}", action, err);
                false
            }
        }
    }

    fn is_pressed(&self, pos: Coord2, view: CellView) -> bool {
        if self.session.state().is_finished() || view != CellView::Hidden {
            return false;
        }
        match (self.gesture.pressed_cell(), self.gesture.chord_anchor()) {
            (Some(pressed), _) => pressed == pos,
            (_, Some(anchor)) => self.session.can_chord_at(anchor) && is_adjacent_or_same(anchor, pos),
            _ => false,
        }
    }

    fn create_timer(ctx: &Context<Self>) -> Interval {
        let link = ctx.link().clone();
        Interval::new(500, move || link.send_message(Msg::UpdateTime))
    }

    fn create_release_listener(ctx: &Context<Self>) -> EventListener {
        let link = ctx.link().clone();
        EventListener::new(&gloo::utils::window(), "mouseup", move |_| {
            link.send_message(Msg::ReleaseOutside)
        })
    }

    fn update_gesture(&mut self, change: impl FnOnce(&mut ChordGesture)) -> bool {
        let before = self.gesture;
        change(&mut self.gesture);
        before != self.gesture
    }

    fn view_dialog(&self, ctx: &Context<Self>) -> Html {
        let Some(dialog) = &self.dialog else {
            return html! {};
        };
        let cb_close = ctx.link().callback(|_| Msg::CloseDialog);

        let content = match dialog {
            Dialog::Lost => {
                let cb_new_game = ctx.link().callback(|_| Msg::NewGame);
                html! {
                    <article>
                        <h2>{"Boom"}</h2>
                        <p>{"You hit a mine."}</p>
                        <footer>
                            <button onclick={cb_close}>{"Close"}</button>
                            <button onclick={cb_new_game}>{"New game"}</button>
                        </footer>
                    </article>
                }
            }
            Dialog::Won { time } => {
                let oninput = ctx.link().callback(|e: InputEvent| {
                    let input: HtmlInputElement = e.target_unchecked_into();
                    Msg::UsernameInput(input.value())
                });
                let cb_submit = ctx.link().callback(|_| Msg::SubmitScore);
                html! {
                    <article>
                        <h2>{"You won!"}</h2>
                        <p>{format!("{} in {}s. Enter a name to submit your time.", self.session.tier().label(), time)}</p>
                        <input
                            type="text"
                            value={self.prefs.username.clone()}
                            {oninput}
                        />
                        <footer>
                            <button onclick={cb_close}>{"Skip"}</button>
                            <button onclick={cb_submit}>{"Submit"}</button>
                        </footer>
                    </article>
                }
            }
            Dialog::Submitting => html! {
                <article><p>{"Submitting…"}</p></article>
            },
            Dialog::Notice { title, body } => html! {
                <article>
                    <h2>{title}</h2>
                    <p>{body}</p>
                    <footer><button onclick={cb_close}>{"OK"}</button></footer>
                </article>
            },
        };

        html! {
            <Modal>
                <dialog open={true}>{content}</dialog>
            </Modal>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let mut prefs = Preferences::local_or_default();
        if let Some(tier) = props.tier {
            prefs.tier = tier;
        }
        let seed = props.seed.unwrap_or_else(js_random_seed);

        Self {
            session: GameSession::new(prefs.tier, seed),
            prefs,
            fixed_seed: props.seed,
            gesture: ChordGesture::default(),
            touch: None,
            dialog: None,
            leaderboard_version: 0,
            prev_time: 0,
            _timer_interval: GameView::create_timer(ctx),
            _release_listener: GameView::create_release_listener(ctx),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use CellMsg::*;
        use Msg::*;

        match msg {
            Cell(Press(button, pos)) => self.update_gesture(|gesture| {
                gesture.press(button, pos);
            }),
            Cell(Release(button, pos)) => {
                let action = self.gesture.release(button, pos);
                log::debug!("{:?} released at {:?}: {:?}", button, pos, action);
                self.apply(action);
                true
            }
            Cell(Enter(pos, buttons)) => self.update_gesture(|gesture| {
                // buttons let go while the pointer was outside the page
                if buttons.is_empty() {
                    gesture.release_outside();
                }
                gesture.enter(pos);
            }),
            Cell(TouchStart(pos)) => {
                let link = ctx.link().clone();
                let timer = Timeout::new(LONG_PRESS_MS, move || link.send_message(LongPress(pos)));
                self.touch = Some((pos, timer));
                false
            }
            Cell(TouchEnd) => match self.touch.take() {
                Some((pos, timer)) => {
                    timer.cancel();
                    self.apply(GestureAction::Reveal(pos))
                }
                None => false,
            },
            Cell(TouchMove) => {
                self.touch = None;
                false
            }
            LongPress(pos) => match self.touch.take() {
                Some((touched, _)) if touched == pos => self.apply(GestureAction::ToggleFlag(pos)),
                _ => false,
            },
            LeaveBoard => self.update_gesture(ChordGesture::leave),
            ReleaseOutside => self.update_gesture(ChordGesture::release_outside),
            UpdateTime => {
                let time = self.session.elapsed_secs();
                if self.prev_time != time {
                    self.prev_time = time;
                    true
                } else {
                    false
                }
            }
            NewGame => {
                self.restart(self.session.tier());
                true
            }
            SelectTier(tier) => {
                self.prefs.tier = tier;
                self.prefs.local_save();
                self.restart(tier);
                true
            }
            UsernameInput(username) => {
                let clamped = clamp_username(&username);
                // re-render only to push the cut value back into the input
                let truncated = clamped.len() != username.len();
                self.prefs.username = clamped;
                truncated
            }
            SubmitScore => {
                let Some(Dialog::Won { time }) = self.dialog else {
                    return false;
                };
                self.prefs.local_save();
                self.dialog = Some(Dialog::Submitting);

                let tier = self.session.tier();
                let username = self.prefs.username.clone();
                ctx.link().send_future(async move {
                    SubmitDone(time, leaderboard::submit_flow(tier, username, time).await)
                });
                true
            }
            SubmitDone(time, result) => {
                let (title, body) = match &result {
                    Ok(flow) => leaderboard::flow_message(flow, time),
                    Err(err) => ("Submission failed".to_string(), err.clone()),
                };
                if matches!(result, Ok(SubmitFlow::Submitted(_))) {
                    self.leaderboard_version += 1;
                }
                self.dialog = Some(Dialog::Notice { title, body });
                true
            }
            CloseDialog => self.dialog.take().is_some(),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let (cols, rows) = self.session.size();
        let tier = self.session.tier();
        let game_state_class = face_class(self.session.state(), &self.gesture);
        let mines_left = format_mines_left(self.session.mines_left());
        let elapsed_time = format_elapsed(self.session.elapsed_secs());
        let is_playable = !self.session.state().is_finished();

        let cb_new_game = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            NewGame
        });
        let cb_leave = ctx.link().callback(|_: MouseEvent| LeaveBoard);
        let tier_buttons = Tier::ALL.into_iter().map(|option| {
            let onclick = ctx.link().callback(move |_| SelectTier(option));
            let class = classes!((option == tier).then_some("active"));
            html! { <button {class} {onclick}>{option.label()}</button> }
        });

        html! {
            <div class="minesweeper" oncontextmenu={Callback::from(move |e: MouseEvent| e.prevent_default())}>
                <menu>{for tier_buttons}</menu>
                <nav>
                    <aside>{mines_left}</aside>
                    <span><button class={game_state_class} onclick={cb_new_game}/></span>
                    <aside>{elapsed_time}</aside>
                </nav>
                <table class={is_playable.then_some("playable")} onmouseleave={cb_leave}>
                    {
                        for (0..rows).map(|y| html! {
                            <tr>
                                {
                                    for (0..cols).map(|x| {
                                        let view = self.session.cell_view((x, y));
                                        let pressed = self.is_pressed((x, y), view);
                                        let callback = ctx.link().callback(Msg::Cell);
                                        html! {
                                            <BoardCell {x} {y} {view} {pressed} {callback}/>
                                        }
                                    })
                                }
                            </tr>
                        })
                    }
                </table>
                <LeaderboardPanel {tier} version={self.leaderboard_version}/>
                {self.view_dialog(ctx)}
            </div>
        }
    }
}
