use std::rc::{Rc, Weak};

use anyhow::{Context, Result, bail};
use tether_bind::prelude::*;
use tether_core::{ListRef, LoggingConfig, init_logging};

const CLOSING_BID: i64 = 500;

/// Build the lot list and the auction view model around it.
fn auction_model(title: &str, lots: &[&str]) -> (Rc<Record>, ListRef) {
    let list = ObservableList::from_items(lots.iter().copied());

    let target = Rc::clone(&list);
    let add_lot = ActionCommand::new(move |p| {
        if let Some(edit) = ListEdit::from_value(p) {
            if let Err(e) = target.insert(edit.index, edit.item) {
                log::warn!("add lot: {e}");
            }
        }
    });
    let target = Rc::clone(&list);
    let remove_lot = ActionCommand::new(move |p| {
        if let Some(edit) = ListEdit::from_value(p) {
            if let Err(e) = target.remove(edit.index) {
                log::warn!("remove lot: {e}");
            }
        }
    });

    let model = Rc::new(
        Record::new("Auction")
            .with("Title", title)
            .with("Bidder", "")
            .with("Bid", 100)
            .with("Lots", Rc::clone(&list))
            .with("Selected", Value::Null)
            .with("AddLot", add_lot.into_ref())
            .with("RemoveLot", remove_lot.into_ref()),
    );

    // PlaceBid raises the bid by its parameter and disables itself at `CLOSING_BID`.
    let weak = Rc::downgrade(&model);
    let place_bid = Rc::new_cyclic(|me: &Weak<ActionCommand>| {
        let me = me.clone();
        ActionCommand::new(move |p| {
            let Some(model) = weak.upgrade() else { return };
            let step = p.as_int().or_else(|| p.as_str()?.parse().ok()).unwrap_or(1);
            let bid = model.get("Bid").ok().and_then(|v| v.as_int()).unwrap_or(0) + step;
            if let Err(e) = model.set("Bid", Value::Int(bid)) {
                log::warn!("place bid: {e}");
            }
            if bid >= CLOSING_BID {
                if let Some(me) = me.upgrade() {
                    log::info!("bidding closed at {bid}");
                    me.set_enabled(false);
                }
            }
        })
    });
    let cmd: tether_core::CommandRef = place_bid;
    model.define("PlaceBid", cmd);

    (model, list)
}

/// The auction screen: a title, a bidder field, a bid label and button, and
/// the lot list.
struct Screen {
    root: Rc<ViewNode>,
    title: Rc<ViewNode>,
    bidder: Rc<ViewNode>,
    bid: Rc<ViewNode>,
    place_bid: Rc<ViewNode>,
    lots: Rc<ViewNode>,
}

impl Screen {
    fn build() -> Self {
        let root = ViewNode::container().into_ref();
        let bound = |view: ViewNode, binding: &str| {
            ViewNode::attach(&root, view.with("Bind", binding).into_ref())
        };
        let title = bound(ViewNode::label(), "{Binding Title}");
        let bidder = bound(ViewNode::text_box(), "{Binding Bidder, Mode=TwoWay}");
        let bid = bound(ViewNode::label(), "{Binding .Text=Bid}");
        let place_bid = bound(
            ViewNode::button("Bid"),
            "{Binding PlaceBid, Mode=Command} {CommandParameter 25}",
        );
        let lots = bound(
            ViewNode::list(),
            "{Binding Selected, Mode=TwoWay} \
             {List ItemsSource=Lots, ItemTemplate=LotRow, AddCommand=AddLot, RemoveCommand=RemoveLot, CanEdit=true, CanMove=true}",
        );
        // An unbound decoration, skipped by discovery.
        ViewNode::attach(&root, ViewNode::label().with("Text", "-- lots --").into_ref());

        Self { root, title, bidder, bid, place_bid, lots }
    }

    fn print(&self, heading: &str) {
        println!();
        println!("  [{heading}]");
        println!("  title    {}", self.title.value("Text"));
        println!("  bidder   {}", self.bidder.value("Text"));
        println!("  bid      {}", self.bid.value("Text"));
        println!("  button   {}", if self.place_bid.is_enabled() { "enabled" } else { "disabled" });
        for (i, row) in self.lots.rows().iter().enumerate() {
            println!("  lot {i}    {:<10} ({})", row.item.to_string(), row.template);
        }
        println!("  selected {}", self.lots.value("SelectedItem"));
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  ╔════════════════════════════════════════╗");
    println!("  ║        TETHER AUCTION HOUSE v0.1       ║");
    println!("  ║   headless views  ·  tether bindings   ║");
    println!("  ╚════════════════════════════════════════╝");

    let (model, lots) = auction_model("Spring sale", &["clock", "vase", "lamp"]);
    let screen = Screen::build();

    // ── Discovery ─────────────────────────────────────────────────────────
    let root: ViewRef = screen.root.clone();
    let mut index = RootIndex::new();
    index.extend(discover(&root, &MemberDiscovery::default()));
    log::info!("discovered bindings under {} root(s)", index.len());

    let engine = BindingEngine::new(model.clone(), "auction.");
    engine
        .add_bindings(index.take(&root))
        .context("registering auction bindings")?;
    engine.update_view().context("initial refresh")?;
    log::info!("{} bindings live", engine.len());
    screen.print("OPENING");

    // ── Interaction ───────────────────────────────────────────────────────
    screen.bidder.user_input("Text", "ada")?;
    screen.place_bid.tap(Value::Null);
    screen.place_bid.tap(Value::Int(50));
    screen.lots.select_row(1);
    screen.place_bid.tap(Value::Int(400));
    screen.place_bid.tap(Value::Int(400));

    let adapter = engine
        .list_adapter("auction.Selected")
        .context("lot list has no adapter")?;
    if !adapter.insert(lots.len(), Value::from("mirror"))? {
        bail!("inserting a lot was rejected");
    }
    adapter.move_item(0, 2)?;
    adapter.remove(1)?;
    screen.print("BIDDING");
    log::info!(
        "model: bidder={} bid={} selected={}",
        model.get("Bidder")?,
        model.get("Bid")?,
        model.get("Selected")?,
    );

    // ── Next auction ──────────────────────────────────────────────────────
    let (next, _) = auction_model("Autumn sale", &["desk", "chair"]);
    engine.set_view_model(next.clone()).context("switching auctions")?;
    model.set("Title", Value::from("closed"))?;
    screen.print("NEXT AUCTION");

    engine.remove_handlers()?;
    log::info!("handlers detached; {} bindings kept", engine.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bidding_closes_at_the_limit() {
        let (model, _) = auction_model("Test sale", &[]);
        let button = ViewNode::button("Bid").into_ref();
        let engine = BindingEngine::new(model.clone(), "auction.");
        engine
            .add_bindings([BoundView::new(button.clone(), "{Binding PlaceBid, Mode=Command}")])
            .unwrap();

        button.tap(Value::Int(350));
        assert_eq!(model.get("Bid").unwrap(), Value::Int(450));
        assert!(button.is_enabled());

        button.tap(Value::Int(60));
        assert_eq!(model.get("Bid").unwrap(), Value::Int(510));
        assert!(!button.is_enabled());

        button.tap(Value::Int(60));
        assert_eq!(model.get("Bid").unwrap(), Value::Int(510));
    }
}
