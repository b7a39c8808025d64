//! Unit tests for the order book core.


#[cfg(test)]
pub(crate) mod helpers {
    use std::sync::{Arc, Mutex};

    use crate::orderbook::{Event, Instrument, Order, OrderBook, OrderId, Side};

    pub(crate) fn instrument() -> Instrument {
        Instrument::new("X")
    }

    /// A limit order with a deterministic timestamp derived from its id.
    pub(crate) fn limit(id: u64, side: Side, volume: f64, price: f64) -> Order {
        Order::limit(OrderId(id), side, volume, price, instrument()).with_timestamp(id)
    }

    /// A market order with a deterministic timestamp derived from its id.
    pub(crate) fn market(id: u64, side: Side, volume: f64) -> Order {
        Order::market(OrderId(id), side, volume, 0.0, instrument()).with_timestamp(id)
    }

    /// A stop order watching `target`.
    pub(crate) fn stop(id: u64, side: Side, volume: f64, price: f64, target: u64) -> Order {
        Order::stop(OrderId(id), side, volume, price, OrderId(target), instrument())
            .with_timestamp(id)
    }

    /// A book whose sink records every committed event.
    pub(crate) fn recording_book() -> (OrderBook, Arc<Mutex<Vec<Event>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let recorded = events.clone();
        let mut book = OrderBook::new(instrument());
        book.set_callback(Arc::new(move |event: &Event| {
            recorded.lock().unwrap().push(event.clone());
        }));
        (book, events)
    }

    /// Compact event-kind labels for sequence assertions.
    pub(crate) fn kinds(events: &[Event]) -> Vec<String> {
        events
            .iter()
            .map(|event| match event {
                Event::Open(o) => format!("open:{}", o.id),
                Event::Cancel(o) => format!("cancel:{}", o.id),
                Event::Change(o) => format!("change:{}", o.id),
                Event::Fill(o) => format!("fill:{}", o.id),
                Event::Trade(t) => format!("trade:{}", t.taker_order.id),
            })
            .collect()
    }
}
